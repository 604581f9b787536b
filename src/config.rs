use std::path::PathBuf;

use crate::error::{GapminderError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: u16,
    pub end: u16,
    pub step: u16,
}

impl YearRange {
    pub fn contains(&self, year: u16) -> bool {
        (self.start..=self.end).contains(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = u16> {
        (self.start..=self.end).step_by(self.step.max(1) as usize)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub gdp_file: String,
    pub regions_file: String,
    pub lex_file: String,
    pub pop_file: String,
    pub output_path: PathBuf,
    pub snapshot_year: u16,
    pub slider: YearRange,
    pub plot_width: u32,
    pub plot_height: u32,
    /// Data coordinates of the first legend label.
    pub legend_origin: (f64, f64),
    /// Vertical distance between legend rows, in life-expectancy years.
    pub legend_step: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("data/gapminder"),
            gdp_file: "indicator_gapminder_gdp_per_capita_ppp.csv".to_string(),
            regions_file: "geographical_regions.csv".to_string(),
            lex_file: "indicator_gapminder_life_expectancy_at_birth.csv".to_string(),
            pop_file: "indicator_gapminder_population.csv".to_string(),
            output_path: PathBuf::from("gdp_lex_gapminder.html"),
            snapshot_year: 2015,
            slider: YearRange {
                start: 1800,
                end: 2015,
                step: 1,
            },
            plot_width: 700,
            plot_height: 600,
            legend_origin: (15000.0, 20.0),
            legend_step: 3.0,
        }
    }
}

impl Config {
    pub fn gdp_path(&self) -> PathBuf {
        self.data_dir.join(&self.gdp_file)
    }

    pub fn regions_path(&self) -> PathBuf {
        self.data_dir.join(&self.regions_file)
    }

    pub fn lex_path(&self) -> PathBuf {
        self.data_dir.join(&self.lex_file)
    }

    pub fn pop_path(&self) -> PathBuf {
        self.data_dir.join(&self.pop_file)
    }

    pub fn validate(&self) -> Result<()> {
        if self.slider.step == 0 {
            return Err(GapminderError::Config("slider step must be positive".into()));
        }
        if self.slider.start > self.slider.end {
            return Err(GapminderError::Config(format!(
                "slider starts at {} after its end {}",
                self.slider.start, self.slider.end
            )));
        }
        if !self.slider.contains(self.snapshot_year) {
            return Err(GapminderError::Config(format!(
                "snapshot year {} is outside the slider range {}..={}",
                self.snapshot_year, self.slider.start, self.slider.end
            )));
        }
        if (self.snapshot_year - self.slider.start) % self.slider.step != 0 {
            return Err(GapminderError::Config(format!(
                "snapshot year {} is not on the slider's {}-year steps from {}",
                self.snapshot_year, self.slider.step, self.slider.start
            )));
        }
        if self.plot_width == 0 || self.plot_height == 0 {
            return Err(GapminderError::Config("plot size must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.slider.years().count(), 216);
        assert!(config.gdp_path().ends_with("indicator_gapminder_gdp_per_capita_ppp.csv"));
    }

    #[test]
    fn snapshot_outside_slider_is_rejected() {
        let config = Config {
            snapshot_year: 2020,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(GapminderError::Config(_))));
    }

    #[test]
    fn snapshot_off_the_step_grid_is_rejected() {
        let mut config = Config::default();
        config.slider.step = 5;
        config.snapshot_year = 2013;
        assert!(matches!(config.validate(), Err(GapminderError::Config(_))));

        config.snapshot_year = 2015;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn inverted_slider_is_rejected() {
        let mut config = Config::default();
        config.slider = YearRange {
            start: 2000,
            end: 1990,
            step: 1,
        };
        assert!(config.validate().is_err());
    }
}
