/// Selects between the real insight service and an offline stand-in.
///
/// When `BIBLIOPAY_IN_TEST_MODE` is set and non-empty the program never leaves the machine, which
/// allows the whole CLI to be exercised without network access or an API key.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Live,
    Offline,
}

pub const TEST_MODE_ENV: &str = "BIBLIOPAY_IN_TEST_MODE";

impl Mode {
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(v) if !v.is_empty() => Mode::Offline,
            _ => Mode::Live,
        }
    }
}
