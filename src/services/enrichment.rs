/// Sentinel stored for any enrichment field that could not be resolved
pub const UNKNOWN: &str = "Desconocido";

/// Outcome of a best-effort lookup. A degraded result still carries a usable
/// value (the unknown defaults) plus the reason the lookup fell back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment<T> {
    Resolved(T),
    Degraded { value: T, reason: String },
}

impl<T> Enrichment<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Enrichment::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Enrichment::Degraded { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Enrichment::Resolved(value) | Enrichment::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Enrichment::Resolved(value) | Enrichment::Degraded { value, .. } => value,
        }
    }
}
