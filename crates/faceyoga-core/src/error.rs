//! Declarative error conversion at crate boundaries.

/// Define how an error from a lower layer becomes an error of this layer.
///
/// Expands to a `From` implementation, so `?` converts automatically at the
/// boundary instead of scattering `map_err()` calls through call sites.
///
/// # Syntax
///
/// ```ignore
/// error_boundary!(SourceError => TargetError, |err_var| {
///     // conversion logic returning TargetError
/// });
/// ```
///
/// # Example
///
/// ```
/// use faceyoga_core::error_boundary;
/// use std::io;
///
/// #[derive(Debug, thiserror::Error)]
/// enum UploadError {
///     #[error("Could not read file: {0}")]
///     Read(String),
/// }
///
/// error_boundary!(io::Error => UploadError, |e| {
///     UploadError::Read(e.to_string())
/// });
///
/// fn read_photo() -> Result<Vec<u8>, UploadError> {
///     let bytes = std::fs::read("/tmp/progress.jpg")?;
///     Ok(bytes)
/// }
/// ```
#[macro_export]
macro_rules! error_boundary {
    ($inner:ty => $outer:ty, |$err:ident| $body:expr) => {
        impl ::std::convert::From<$inner> for $outer {
            fn from($err: $inner) -> $outer {
                $body
            }
        }
    };
}
