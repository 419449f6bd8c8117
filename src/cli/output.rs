//! CLI output formatting.
//!
//! Handles output for the text and JSON formats.

use console::style;
use serde::Serialize;

use crate::cli::scenario::ScenarioReport;
use crate::core::config::EngineParams;
use crate::utils::math::format_units;

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT FORMAT
// ═══════════════════════════════════════════════════════════════════════════════

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
    /// Pretty JSON format
    JsonPretty,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Ok(OutputFormat::JsonPretty),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT FORMATTER
// ═══════════════════════════════════════════════════════════════════════════════

/// Output formatter for CLI
#[derive(Debug, Clone, Default)]
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Create new formatter
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Get format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json | OutputFormat::JsonPretty)
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        if self.is_json() {
            self.print_json(&serde_json::json!({ "status": "success", "message": message }));
        } else {
            println!("{} {}", style("✓").green(), message);
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        if self.is_json() {
            self.print_json(&serde_json::json!({ "status": "error", "message": message }));
        } else {
            eprintln!("{} {}", style("✗").red(), message);
        }
    }

    /// Print section header
    pub fn section(&self, title: &str) {
        if !self.is_json() {
            println!();
            println!("{}", style(format!("=== {} ===", title)).cyan().bold());
            println!();
        }
    }

    /// Print key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.is_json() {
            self.print_json(&serde_json::json!({ key: value }));
        } else {
            println!("{}: {}", style(key).bold(), value);
        }
    }

    /// Print protocol parameters
    pub fn params(&self, params: &EngineParams) {
        if self.is_json() {
            self.print_json(params);
            return;
        }
        self.section("Protocol Parameters");
        let pct = |v: u128| format!("{}%", v * 100 / params.liquidation_precision.max(1));
        self.kv("Liquidation threshold", &pct(params.liquidation_threshold));
        self.kv("Liquidation bonus", &pct(params.liquidation_bonus));
        self.kv("Liquidation precision", &params.liquidation_precision.to_string());
        self.kv("Minimum health factor", &format_units(params.min_health_factor));
        self.kv("Precision", &params.precision.to_string());
    }

    /// Print a scenario report
    pub fn report(&self, report: &ScenarioReport) {
        if self.is_json() {
            self.print_json(report);
            return;
        }

        self.section(&format!("Scenario: {}", report.scenario));
        for step in &report.steps {
            match (&step.code, &step.error) {
                (Some(code), Some(error)) => println!(
                    "{} {:>2}. {} {}",
                    style("✗").red(),
                    step.index,
                    step.description,
                    style(format!("[{}] {}", code, error)).red()
                ),
                _ => println!("{} {:>2}. {}", style("✓").green(), step.index, step.description),
            }
        }

        self.section("Accounts");
        for account in &report.accounts {
            println!("{} {}", style(&account.actor).yellow().bold(), style(&account.address).dim());
            for (asset, amount) in &account.collateral {
                println!("    {:<12} {}", asset, amount);
            }
            println!("    {:<12} {}", "debt", account.debt);
            println!("    {:<12} ${}", "value", account.collateral_value_usd);
            println!("    {:<12} {}", "health", account.health_factor);
            println!("    {:<12} {}", "DSC held", account.stable_balance);
            for (asset, amount) in &account.wallet {
                println!("    {:<12} {}", format!("{} wallet", asset), amount);
            }
        }

        println!();
        let chain = if report.chain_valid {
            style("valid").green()
        } else {
            style("BROKEN").red()
        };
        println!("{} events, hash chain {}", report.events, chain);
    }

    fn print_json<T: Serialize + ?Sized>(&self, data: &T) {
        let output = if matches!(self.format, OutputFormat::JsonPretty) {
            serde_json::to_string_pretty(data)
        } else {
            serde_json::to_string(data)
        };

        if let Ok(json) = output {
            println!("{}", json);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("json-pretty".parse::<OutputFormat>().unwrap(), OutputFormat::JsonPretty);
        assert!("table".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_formatter_creation() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        assert_eq!(formatter.format(), OutputFormat::Json);
        assert_eq!(OutputFormatter::default().format(), OutputFormat::Text);
    }
}
