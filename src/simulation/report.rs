//! Console reports for finished runs and inspected programs

use std::fmt;

use super::aggregator::RunStats;
use super::program_editor::{ProgramInspection, RewriteSummary};

const RULE_WIDTH: usize = 40;
const KEY_WIDTH: usize = 30;

/// Format with thousands separators and four decimals, e.g. `12,345.6789`
pub fn format_float(value: f64) -> String {
    let formatted = format!("{:.4}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "0000"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value.is_sign_negative() && value != 0.0 {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac_part)
}

fn float_line(f: &mut fmt::Formatter<'_>, key: &str, value: f64) -> fmt::Result {
    writeln!(f, "{:<width$}: {}", key, format_float(value), width = KEY_WIDTH)
}

fn int_line(f: &mut fmt::Formatter<'_>, key: &str, value: u64) -> fmt::Result {
    writeln!(f, "{:<width$}: {}", key, value, width = KEY_WIDTH)
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(f, "{}", rule)?;
        writeln!(f, "FULL SIMULATION REPORT")?;
        writeln!(f, "{}", rule)?;
        float_line(f, "total_waiting_time", self.total_waiting_time)?;
        float_line(f, "total_co2_emissions", self.total_co2_emissions)?;
        float_line(f, "total_fuel_consumption", self.total_fuel_consumption)?;
        float_line(f, "mean_network_speed", self.mean_network_speed)?;
        int_line(f, "total_arrived_vehicles", self.total_arrived_vehicles)?;
        int_line(f, "total_collisions", self.total_collisions)?;
        int_line(f, "total_teleported", self.total_teleported)?;
        int_line(f, "vehicles_not_arrived", self.vehicles_not_arrived)?;
        int_line(f, "steps_simulated", u64::from(self.steps_simulated))?;
        float_line(f, "simulation_runtime_seconds", self.runtime.as_secs_f64())?;
        write!(f, "{}", rule)
    }
}

impl fmt::Display for RewriteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rewrite in &self.rewrites {
            writeln!(
                f,
                "[{}] TLS '{}' (program {}) -> {} green phases set to {}s",
                if rewrite.rank % 2 == 0 { "EVEN" } else { "ODD" },
                rewrite.control_point,
                rewrite.program_id,
                rewrite.phases_changed,
                rewrite.target_duration
            )?;
        }
        write!(
            f,
            "Modified {} phases across {} traffic lights",
            self.total_phases_changed(),
            self.len()
        )
    }
}

impl fmt::Display for ProgramInspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Intersection ID: {}", self.control_point)?;
        writeln!(f, "  > Current Program ID : {}", self.program_id)?;
        writeln!(f, "  > Total Cycle Time   : {} seconds", self.cycle_time)?;
        writeln!(f, "  > Number of Phases   : {}", self.phases.len())?;
        write!(f, "  > Phase Breakdown    :")?;
        for phase in &self.phases {
            write!(
                f,
                "\n      Phase {}: {}s  | State: {} {}",
                phase.index,
                phase.duration,
                phase.state,
                if phase.is_modifiable() {
                    "[MODIFIABLE]"
                } else {
                    "[FIXED]"
                }
            )?;
        }
        Ok(())
    }
}

/// Render the inspection of a whole network
pub fn inspection_report(inspections: &[ProgramInspection]) -> String {
    let rule = "=".repeat(60);
    let mut out = format!(
        "Total Intersections (Traffic Light Systems): {}\n{}\n",
        inspections.len(),
        rule
    );
    for inspection in inspections {
        out.push_str(&inspection.to_string());
        out.push('\n');
        out.push_str(&"-".repeat(60));
        out.push('\n');
    }
    out
}
