use std::borrow::Cow;

use thiserror::Error;

/// An error around some option-setting, and the reason.
///
/// These are meant to potentially be user-facing (e.g. explain
/// why it's broken and what to fix), and as so treat it as such!
///
/// For stylistic and consistency reasons, use _single quotes_ (e.g. `'bad'`)
/// for highlighting error values.
#[derive(Debug, PartialEq, Error)]
pub enum OptionError {
    #[error("Configuration file error: {0}")]
    Config(Cow<'static, str>),
    #[error("Argument error: {0}")]
    Argument(Cow<'static, str>),
    #[error("Error with the config file or the arguments: {0}")]
    Other(Cow<'static, str>),
}

impl OptionError {
    /// Create a new [`OptionError::Config`].
    pub(crate) fn config<R: Into<Cow<'static, str>>>(reason: R) -> Self {
        OptionError::Config(reason.into())
    }

    /// Create a new [`OptionError::Config`] for an invalid value.
    pub(crate) fn invalid_config_value(value: &str) -> Self {
        OptionError::Config(Cow::Owned(format!(
            "'{value}' was set with an invalid value, please update it in your config file."
        )))
    }

    /// Create a new [`OptionError::Argument`] for an invalid value.
    pub(crate) fn invalid_arg_value(value: &str) -> Self {
        OptionError::Argument(Cow::Owned(format!(
            "'--{value}' was set with an invalid value, please update your arguments."
        )))
    }
}

pub type OptionResult<T> = Result<T, OptionError>;

impl From<toml_edit::de::Error> for OptionError {
    fn from(err: toml_edit::de::Error) -> Self {
        OptionError::Config(err.to_string().into())
    }
}

impl From<std::io::Error> for OptionError {
    fn from(err: std::io::Error) -> Self {
        OptionError::Other(err.to_string().into())
    }
}
