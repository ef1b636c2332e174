//! Registry hostname to server address mapping

/// Server address Docker Hub credentials are stored under
pub const DOCKER_HUB_SERVER_ADDRESS: &str = "https://index.docker.io/v1/";

/// Map a registry hostname to the server address its credentials are stored under.
///
/// Docker Hub credentials are keyed by the legacy index URL; every other host
/// is used as is.
pub fn server_address_from_hostname(hostname: &str) -> &str {
    match hostname {
        "docker.io" | "registry-1.docker.io" => DOCKER_HUB_SERVER_ADDRESS,
        _ => hostname,
    }
}
