//! TLS configuration and certificate loading.

use axum_server::tls_rustls::RustlsConfig;
use std::io;
use std::path::Path;

/// Load the PEM certificate chain and private key for the TLS listener.
///
/// Read failures name the `listener.tls` key whose file is at fault.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> io::Result<RustlsConfig> {
    let cert = read_pem("cert_path", cert_path).await?;
    let key = read_pem("key_path", key_path).await?;
    RustlsConfig::from_pem(cert, key).await
}

async fn read_pem(key: &str, path: &Path) -> io::Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("listener.tls.{key} {}: {e}", path.display()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_certificate() {
        let err = load_tls_config(
            Path::new("/nonexistent/cert.pem"),
            Path::new("/nonexistent/key.pem"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("listener.tls.cert_path"), "{err}");
    }

    #[tokio::test]
    async fn test_missing_key_is_named() {
        let cert = std::env::temp_dir().join(format!("edge-proxy-cert-{}.pem", std::process::id()));
        tokio::fs::write(&cert, b"placeholder").await.unwrap();

        let err = load_tls_config(&cert, Path::new("/nonexistent/key.pem"))
            .await
            .unwrap_err();
        let _ = tokio::fs::remove_file(&cert).await;

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("listener.tls.key_path"), "{err}");
    }
}
