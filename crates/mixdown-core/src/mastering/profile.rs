//! Mastering profiles
//!
//! A profile bundles the parameters of every mastering stage. Three built-in
//! profiles exist; callers pick one by name and unknown names fall back to
//! [`ProfileName::Clean`].
//!
//! # Built-ins
//!
//! | profile | eq low | eq mid | eq high | comp thr | ratio | limiter | target LUFS |
//! |---------|--------|--------|---------|----------|-------|---------|-------------|
//! | clean   | 0      | 0      | 0       | -20      | 2.0   | -1.0    | -14         |
//! | warm    | 2      | -1     | -1      | -18      | 3.0   | -0.5    | -12         |
//! | loud    | 1      | 1      | 2       | -15      | 4.0   | -0.3    | -10         |

use serde::{Deserialize, Serialize};

use crate::error::{MixdownError, Result};

/// Built-in profile identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileName {
    #[default]
    Clean,
    Warm,
    Loud,
}

impl ProfileName {
    /// All built-in profiles
    pub const ALL: [ProfileName; 3] = [ProfileName::Clean, ProfileName::Warm, ProfileName::Loud];

    /// Resolve a profile name, falling back to `Clean` for anything unknown
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn resolve(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "clean" => ProfileName::Clean,
            "warm" => ProfileName::Warm,
            "loud" => ProfileName::Loud,
            other => {
                log::debug!("Unknown mastering profile '{}', using clean", other);
                ProfileName::Clean
            }
        }
    }

    /// Name as used in requests
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileName::Clean => "clean",
            ProfileName::Warm => "warm",
            ProfileName::Loud => "loud",
        }
    }

    /// Parameters of this built-in profile
    pub fn profile(&self) -> MasteringProfile {
        match self {
            ProfileName::Clean => MasteringProfile {
                eq_low_db: 0.0,
                eq_mid_db: 0.0,
                eq_high_db: 0.0,
                compression_threshold_db: -20.0,
                compression_ratio: 2.0,
                limiter_threshold_db: -1.0,
                target_lufs: -14.0,
            },
            ProfileName::Warm => MasteringProfile {
                eq_low_db: 2.0,
                eq_mid_db: -1.0,
                eq_high_db: -1.0,
                compression_threshold_db: -18.0,
                compression_ratio: 3.0,
                limiter_threshold_db: -0.5,
                target_lufs: -12.0,
            },
            ProfileName::Loud => MasteringProfile {
                eq_low_db: 1.0,
                eq_mid_db: 1.0,
                eq_high_db: 2.0,
                compression_threshold_db: -15.0,
                compression_ratio: 4.0,
                limiter_threshold_db: -0.3,
                target_lufs: -10.0,
            },
        }
    }
}

impl std::fmt::Display for ProfileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for one run of the mastering chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MasteringProfile {
    /// Low shelf gain in dB (0 = stage skipped)
    pub eq_low_db: f32,
    /// Mid band gain in dB. Carried for completeness, not applied.
    pub eq_mid_db: f32,
    /// High shelf gain in dB (0 = stage skipped)
    pub eq_high_db: f32,
    /// Compressor threshold in dBFS
    pub compression_threshold_db: f32,
    /// Compressor ratio (N:1)
    pub compression_ratio: f32,
    /// Limiter ceiling in dBFS
    pub limiter_threshold_db: f32,
    /// Loudness target in LUFS. Carried for completeness, not enforced.
    pub target_lufs: f32,
}

impl Default for MasteringProfile {
    fn default() -> Self {
        ProfileName::Clean.profile()
    }
}

impl MasteringProfile {
    /// Parameters for a profile name, unknown names resolve to clean
    pub fn by_name(name: &str) -> Self {
        ProfileName::resolve(name).profile()
    }

    /// Reject profiles the chain cannot run
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("eq_low_db", self.eq_low_db),
            ("eq_mid_db", self.eq_mid_db),
            ("eq_high_db", self.eq_high_db),
            ("compression_threshold_db", self.compression_threshold_db),
            ("compression_ratio", self.compression_ratio),
            ("limiter_threshold_db", self.limiter_threshold_db),
            ("target_lufs", self.target_lufs),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(MixdownError::invalid(format!(
                "profile field {} is not finite ({})",
                name, value
            )));
        }
        if self.compression_ratio < 1.0 {
            return Err(MixdownError::invalid(format!(
                "compression ratio must be at least 1.0 (got {})",
                self.compression_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let warm = ProfileName::Warm.profile();
        assert_eq!(warm.eq_low_db, 2.0);
        assert_eq!(warm.eq_high_db, -1.0);
        assert_eq!(warm.compression_threshold_db, -18.0);
        assert_eq!(warm.compression_ratio, 3.0);
        assert_eq!(warm.limiter_threshold_db, -0.5);

        let loud = ProfileName::Loud.profile();
        assert_eq!(loud.compression_ratio, 4.0);
        assert_eq!(loud.limiter_threshold_db, -0.3);
        assert_eq!(loud.target_lufs, -10.0);
    }

    #[test]
    fn test_unknown_name_resolves_to_clean() {
        assert_eq!(ProfileName::resolve("disco"), ProfileName::Clean);
        assert_eq!(ProfileName::resolve(""), ProfileName::Clean);
        assert_eq!(MasteringProfile::by_name("disco"), ProfileName::Clean.profile());
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        assert_eq!(ProfileName::resolve("LOUD"), ProfileName::Loud);
        assert_eq!(ProfileName::resolve(" Warm "), ProfileName::Warm);
    }

    #[test]
    fn test_builtins_validate() {
        for name in ProfileName::ALL {
            assert!(name.profile().validate().is_ok(), "{} failed validation", name);
        }
    }

    #[test]
    fn test_validate_rejects_bad_ratio_and_nan() {
        let mut profile = MasteringProfile::default();
        profile.compression_ratio = 0.5;
        assert!(matches!(profile.validate(), Err(MixdownError::InvalidInput(_))));

        let mut profile = MasteringProfile::default();
        profile.limiter_threshold_db = f32::NAN;
        assert!(profile.validate().is_err());
    }
}
