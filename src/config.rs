//! rvstim generation configuration
//!
//! Handles parsing and management of rvstim.toml configuration files. A
//! `GenConfig` is immutable once handed to a generator.

use crate::error::{GenError, GenResult};
use crate::ir::{Register, Xlen};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// File name searched for by [`GenConfig::find_and_load`].
pub const CONFIG_FILE_NAME: &str = "rvstim.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Upper bound for any configured count.
pub const MAX_COUNT: u32 = 4096;

/// Inclusive `[min, max]` range for a randomized count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn contains(&self, value: usize) -> bool {
        (self.min as usize..=self.max as usize).contains(&value)
    }

    /// Fail with a configuration error when the range is empty or reaches
    /// past [`MAX_COUNT`].
    pub fn check(&self, what: &str) -> GenResult<()> {
        if self.is_empty() {
            return Err(GenError::config(format!(
                "{} range [{}, {}] is empty",
                what, self.min, self.max
            )));
        }
        if self.max > MAX_COUNT {
            return Err(GenError::config(format!(
                "{} range [{}, {}] exceeds the limit of {}",
                what, self.min, self.max, MAX_COUNT
            )));
        }
        Ok(())
    }
}

/// Root configuration structure matching rvstim.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenConfig {
    /// Architectural register width (32 or 64)
    #[serde(default)]
    pub xlen: Xlen,

    /// Registers no generator may write
    #[serde(default = "default_reserved_regs")]
    pub reserved_regs: Vec<Register>,

    /// Link register written by the jump-chain entry
    #[serde(default = "default_ra")]
    pub ra: Register,

    /// Drop RV32C/RV64C instructions from every selection
    #[serde(default)]
    pub disable_compressed_instr: bool,

    /// Jump-chain generator settings
    #[serde(default)]
    pub jal: JalConfig,

    /// Numeric corner-value generator settings
    #[serde(default)]
    pub corner: CornerConfig,
}

fn default_reserved_regs() -> Vec<Register> {
    vec![Register::Sp, Register::Tp]
}

fn default_ra() -> Register {
    Register::Ra
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            xlen: Xlen::default(),
            reserved_regs: default_reserved_regs(),
            ra: default_ra(),
            disable_compressed_instr: false,
            jal: JalConfig::default(),
            corner: CornerConfig::default(),
        }
    }
}

impl GenConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: GenConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Find and load configuration by searching up from the given directory.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                // Reached root without finding config
                return Ok(Self::default());
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Reject ranges and register choices no generator could satisfy.
    pub fn validate(&self) -> ConfigResult<()> {
        self.validate_registers()?;
        self.jal.validate()?;
        self.corner.validate()
    }

    /// `ra` must be writable: neither `zero` nor reserved.
    pub fn validate_registers(&self) -> ConfigResult<()> {
        if self.ra == Register::Zero || self.reserved_regs.contains(&self.ra) {
            return Err(ConfigError::Invalid(format!(
                "ra ({}) must be writable",
                self.ra
            )));
        }
        Ok(())
    }

    /// Registers that may hold generated values: everything except `zero`
    /// and the reserved set.
    pub fn available_regs(&self) -> Vec<Register> {
        crate::sample::reject_excluded(&Register::ALL, &self.reserved_regs)
    }
}

/// Jump-chain generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JalConfig {
    /// Number of chained jump instructions
    #[serde(default = "default_num_of_jump_instr")]
    pub num_of_jump_instr: CountRange,
}

fn default_num_of_jump_instr() -> CountRange {
    CountRange::new(10, 30)
}

impl JalConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        let jumps = self.num_of_jump_instr;
        if jumps.min < 1 {
            return Err(ConfigError::Invalid(format!(
                "jal.num_of_jump_instr [{}, {}] must have min >= 1",
                jumps.min, jumps.max
            )));
        }
        jumps
            .check("jal.num_of_jump_instr")
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

impl Default for JalConfig {
    fn default() -> Self {
        Self {
            num_of_jump_instr: default_num_of_jump_instr(),
        }
    }
}

/// Numeric corner-value generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornerConfig {
    /// Size of the register pool seeded with corner values
    #[serde(default = "default_num_of_avail_regs")]
    pub num_of_avail_regs: usize,

    /// Number of arithmetic instructions appended after the loads
    #[serde(default = "default_num_of_instr")]
    pub num_of_instr: CountRange,
}

fn default_num_of_avail_regs() -> usize {
    10
}

fn default_num_of_instr() -> CountRange {
    CountRange::new(15, 30)
}

impl CornerConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.num_of_instr
            .check("corner.num_of_instr")
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

impl Default for CornerConfig {
    fn default() -> Self {
        Self {
            num_of_avail_regs: default_num_of_avail_regs(),
            num_of_instr: default_num_of_instr(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GenConfig::default();
        assert_eq!(config.xlen, Xlen::Rv32);
        assert_eq!(config.reserved_regs, vec![Register::Sp, Register::Tp]);
        assert_eq!(config.jal.num_of_jump_instr, CountRange::new(10, 30));
        assert_eq!(config.corner.num_of_avail_regs, 10);
        assert_eq!(config.corner.num_of_instr, CountRange::new(15, 30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
xlen = 64
reserved_regs = ["sp", "tp", "gp"]
disable_compressed_instr = true

[jal]
num_of_jump_instr = { min = 3, max = 5 }

[corner]
num_of_avail_regs = 4
"#;
        let config: GenConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.xlen, Xlen::Rv64);
        assert_eq!(config.reserved_regs.len(), 3);
        assert!(config.disable_compressed_instr);
        assert_eq!(config.ra, Register::Ra);
        assert_eq!(config.jal.num_of_jump_instr, CountRange::new(3, 5));
        assert_eq!(config.corner.num_of_avail_regs, 4);
        assert_eq!(config.corner.num_of_instr, CountRange::new(15, 30));
    }

    #[test]
    fn test_parse_rejects_bad_xlen() {
        assert!(toml::from_str::<GenConfig>("xlen = 16").is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = GenConfig::default();
        config.jal.num_of_jump_instr = CountRange::new(0, 4);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GenConfig::default();
        config.corner.num_of_instr = CountRange::new(9, 2);
        assert!(config.validate().is_err());

        let mut config = GenConfig::default();
        config.reserved_regs.push(Register::Ra);
        assert!(config.validate().is_err());
        assert!(config.validate_registers().is_err());

        let config = GenConfig {
            ra: Register::Zero,
            ..GenConfig::default()
        };
        assert!(config.validate_registers().is_err());
    }

    #[test]
    fn test_count_cap() {
        assert!(CountRange::new(1, MAX_COUNT).check("jumps").is_ok());
        assert!(CountRange::new(1, MAX_COUNT + 1).check("jumps").is_err());

        let mut config = GenConfig::default();
        config.jal.num_of_jump_instr = CountRange::new(10, u32::MAX);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GenConfig::default();
        config.corner.num_of_instr = CountRange::new(0, u32::MAX);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_available_regs() {
        let config = GenConfig::default();
        let regs = config.available_regs();
        assert_eq!(regs.len(), 29);
        assert!(!regs.contains(&Register::Zero));
        assert!(!regs.contains(&Register::Sp));
        assert!(!regs.contains(&Register::Tp));
    }

    #[test]
    fn test_save_and_load() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("rvstim_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);

        let mut config = GenConfig::default();
        config.xlen = Xlen::Rv64;
        config.corner.num_of_avail_regs = 6;
        config.save(&path).unwrap();

        let loaded = GenConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        let nested = dir.join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(GenConfig::find_and_load(&nested).unwrap(), config);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing() {
        let path = Path::new("/nonexistent/rvstim.toml");
        assert!(matches!(
            GenConfig::load(path),
            Err(ConfigError::NotFound(_))
        ));
    }
}
