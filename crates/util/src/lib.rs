//! Core identifiers, traits, and policy constants for the booking backend.
//!
//! This crate provides the foundational types and configuration parameters
//! shared by the server, the CRM service, and the session client.

// ============================================================================
// TRAITS
// ============================================================================
/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over the
/// store-assigned integer key. `ID<Member>` and `ID<Event>` never mix.
pub struct ID<T> {
    inner: i64,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> i64 {
        self.inner
    }
}

impl<T> From<ID<T>> for i64 {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<i64> for ID<T> {
    fn from(inner: i64) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> std::str::FromStr for ID<T> {
    type Err = std::num::ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self::from)
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

/// IDs travel as bare JSON numbers.
impl<T> serde::Serialize for ID<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.inner)
    }
}
impl<'de, T> serde::Deserialize<'de> for ID<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        <i64 as serde::Deserialize>::deserialize(deserializer).map(Self::from)
    }
}

// ============================================================================
// TOKEN POLICY
// ============================================================================
/// Default access token lifetime in days.
pub const TOKEN_TTL_DAYS: u64 = 7;
/// Seconds per day, for converting the configured lifetime.
pub const SECONDS_PER_DAY: u64 = 86_400;
/// Fixed key under which the client persists its token.
pub const TOKEN_KEY: &str = "token";
/// Authorization scheme expected on every protected request.
pub const BEARER: &str = "Bearer ";

// ============================================================================
// CRM DELIVERY
// ============================================================================
/// Delivery attempts per booking notice before giving up.
pub const CRM_ATTEMPTS: usize = 3;
/// Per-attempt timeout for the outbound notice.
pub const CRM_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
/// Linear backoff step between delivery attempts.
pub const CRM_BACKOFF: std::time::Duration = std::time::Duration::from_millis(500);
/// Default page size for notification listings.
pub const CRM_PAGE: usize = 50;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Current wall clock as unix seconds.
pub fn unix() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
/// Falls back to terminal-only logging when the file cannot be created.
#[cfg(feature = "server")]
pub fn log() {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    let mut loggers: Vec<Box<dyn simplelog::SharedLogger>> = Vec::new();
    loggers.push(term);
    match std::fs::create_dir_all("logs")
        .and_then(|_| std::fs::File::create(format!("logs/{}.log", unix())))
    {
        Ok(file) => loggers.push(simplelog::WriteLogger::new(
            log::LevelFilter::Debug,
            config,
            file,
        )),
        Err(e) => eprintln!("file logging disabled: {}", e),
    }
    if simplelog::CombinedLogger::init(loggers).is_err() {
        eprintln!("logger already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing;

    #[test]
    fn ids_compare_by_key() {
        let a = ID::<Thing>::from(1);
        let b = ID::<Thing>::from(2);
        assert!(a < b);
        assert!(a == ID::from(1));
    }

    #[test]
    fn ids_serialize_as_numbers() {
        let id = ID::<Thing>::from(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: ID<Thing> = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ids_parse_from_subject_strings() {
        assert_eq!("7".parse::<ID<Thing>>().unwrap().inner(), 7);
        assert!("seven".parse::<ID<Thing>>().is_err());
    }
}
