//! Where the prebuilt goma client lives for each supported host.

pub const GOMA_CLIENT_BASE_URL: &str =
    "https://brave-jenkins-build-artifacts.s3.us-west-2.amazonaws.com/goma-client";

/// Maps a CPU name, as reported by either Rust or the OS, to the suffix used
/// in goma client artifact names.
pub fn goma_arch(arch: &str) -> Option<&'static str> {
    match arch {
        "x86_64" => Some("x64"),
        "aarch64" | "arm64" => Some("arm64"),
        _ => None,
    }
}

/// Returns the goma client archive URL for `os`/`arch`, or `None` when there
/// is no client for this host. Only macOS is served.
pub fn goma_client_url(os: &str, arch: &str) -> Option<String> {
    if os != "macos" {
        return None;
    }
    match goma_arch(arch) {
        Some(arch) => Some(format!("{GOMA_CLIENT_BASE_URL}/goma-client-mac-{arch}.tar.gz")),
        None => {
            println!("Unknown CPU architecture, skipping brave goma client download");
            None
        }
    }
}

/// [`goma_client_url`] for the machine we are running on.
pub fn host_goma_client_url() -> Option<String> {
    goma_client_url(std::env::consts::OS, std::env::consts::ARCH)
}
