/// Categories of failure across the production line.
///
/// Mirrors the taxonomy in the design notes: fatal init errors, a poisoned
/// lock anywhere in the hierarchy (§5), and invalid CLI/operator input.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum ErrorKind {
    Generic,
    SharedMemory,
    Sync,
    InvalidArgs,
    ThreadSpawn,
}

/// Error type used across the crate.
#[derive(Debug)]
pub struct BurgerError {
    pub mensaje: String,
    pub kind: ErrorKind,
}

impl BurgerError {
    pub fn new(mensaje: &str) -> Self {
        BurgerError {
            mensaje: mensaje.to_string(),
            kind: ErrorKind::Generic,
        }
    }

    pub fn new_of_kind(mensaje: &str, kind: ErrorKind) -> Self {
        BurgerError {
            mensaje: mensaje.to_string(),
            kind,
        }
    }

    pub fn sync<E: std::fmt::Display>(e: E) -> Self {
        BurgerError::new_of_kind(&e.to_string(), ErrorKind::Sync)
    }

    pub fn shmem<E: std::fmt::Display>(e: E) -> Self {
        BurgerError::new_of_kind(&e.to_string(), ErrorKind::SharedMemory)
    }
}

impl std::fmt::Display for BurgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.mensaje)
    }
}

impl std::error::Error for BurgerError {}

impl<T> From<std::sync::PoisonError<T>> for BurgerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        BurgerError::new_of_kind(&e.to_string(), ErrorKind::Sync)
    }
}
