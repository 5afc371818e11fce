/// Convenience result type used across layertuber.
pub type LayertuberResult<T> = Result<T, LayertuberError>;

/// Top-level error taxonomy used by rig, tracking and render APIs.
///
/// A tracker frame without a face is not an error; it is represented as `None` wherever a report
/// may be absent.
#[derive(thiserror::Error, Debug)]
pub enum LayertuberError {
    /// The asset or its configuration failed to load or validate. Fatal at startup.
    #[error("invalid rig: {0}")]
    InvalidRig(String),

    /// A configuration document referenced an unknown report field or held a malformed rule.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A report was normalized before any neutral baseline was captured.
    #[error("not calibrated: normalize requested before the first calibration")]
    NotCalibrated,

    /// A report was missing a field from the closed report vocabulary.
    #[error("missing report field: {0}")]
    MissingReportField(String),

    /// An averaging operation was given no inputs.
    #[error("division by zero: {0}")]
    DivideByZero(String),

    /// A serialized report or manifest line could not be decoded.
    #[error("serialization error: {0}")]
    Serde(String),

    /// The tracker collaborator failed or its stream ended.
    #[error("tracker error: {0}")]
    Tracker(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayertuberError {
    /// Build a [`LayertuberError::InvalidRig`] value.
    pub fn invalid_rig(msg: impl Into<String>) -> Self {
        Self::InvalidRig(msg.into())
    }

    /// Build a [`LayertuberError::InvalidConfig`] value.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Build a [`LayertuberError::MissingReportField`] value.
    pub fn missing_report_field(name: impl Into<String>) -> Self {
        Self::MissingReportField(name.into())
    }

    /// Build a [`LayertuberError::DivideByZero`] value.
    pub fn divide_by_zero(msg: impl Into<String>) -> Self {
        Self::DivideByZero(msg.into())
    }

    /// Build a [`LayertuberError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`LayertuberError::Tracker`] value.
    pub fn tracker(msg: impl Into<String>) -> Self {
        Self::Tracker(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
