//! Renderings of a [`Diagram`]: CSV table, interval listing, whitespace
//! birth/death listing and parallel arrays. None of them re-sort; row order is
//! the diagram order.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::Serialize;

use crate::{PairingError, diagram::Diagram, vertex::GlobalId};

pub const CSV_HEADER: &str = "birth_value,death_value,birth_index,death_index";
pub const INFINITY_MARKER: &str = "INF";
pub const MISSING_ID_MARKER: &str = "-1";

/// Shortest round-trip digits, always with a fractional part. Magnitudes in
/// `[1e-3, 1e7)` print as plain decimals (`1.0`, `0.1`), everything else as
/// `d.dddE±n` (`1.0E-4`, `1.2345678E7`).
pub fn format_value(value: f32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let marker = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return marker.to_string();
    }
    if value == 0.0 {
        let zero = if value.is_sign_negative() { "-0.0" } else { "0.0" };
        return zero.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    // `{:e}` yields the shortest round-trip digits, e.g. `1.2345678e7` or `1e-5`
    let scientific = format!("{magnitude:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (1e-3..1e7).contains(&magnitude) {
        let (int, frac) = if exponent >= 0 {
            let point = exponent as usize + 1;
            if digits.len() > point {
                (digits[..point].to_string(), digits[point..].to_string())
            } else {
                (format!("{digits:0<point$}"), String::new())
            }
        } else {
            let zeros = "0".repeat((-exponent - 1) as usize);
            ("0".to_string(), format!("{zeros}{digits}"))
        };
        let frac = if frac.is_empty() { "0".to_string() } else { frac };
        format!("{sign}{int}.{frac}")
    } else {
        let (lead, rest) = digits.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        format!("{sign}{lead}.{rest}E{exponent}")
    }
}

fn format_death(value: Option<f32>) -> String {
    value.map_or_else(|| INFINITY_MARKER.to_string(), format_value)
}

fn format_death_id(id: Option<GlobalId>) -> String {
    id.map_or_else(|| MISSING_ID_MARKER.to_string(), |id| id.to_string())
}

pub fn csv_lines(diagram: &Diagram) -> Vec<String> {
    let mut lines = Vec::with_capacity(diagram.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for record in diagram.iter() {
        lines.push(format!(
            "{},{},{},{}",
            format_value(record.real_birth),
            format_death(record.real_death()),
            record.birth_id,
            format_death_id(record.death_id()),
        ));
    }
    lines
}

pub fn to_csv(diagram: &Diagram) -> String {
    let mut out = String::new();
    for line in csv_lines(diagram) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn write_csv<W: Write>(diagram: &Diagram, mut writer: W) -> Result<(), PairingError> {
    for line in csv_lines(diagram) {
        writeln!(writer, "{line}").map_err(|e| PairingError::serialization(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| PairingError::serialization(e.to_string()))
}

/// `  [birth,death) birth_id/death_id` per record.
pub fn render_intervals(diagram: &Diagram) -> String {
    let mut out = String::new();
    for record in diagram.iter() {
        out.push_str(&format!(
            "  [{},{}) {}/{}\n",
            format_value(record.real_birth),
            format_death(record.real_death()),
            record.birth_id,
            format_death_id(record.death_id()),
        ));
    }
    out
}

/// Writes one `birth death` line per record.
pub fn save_birth_death<P: AsRef<Path>>(diagram: &Diagram, path: P) -> Result<(), PairingError> {
    let file = File::create(path.as_ref())
        .map_err(|e| PairingError::serialization(format!("{}: {e}", path.as_ref().display())))?;
    let mut writer = BufWriter::new(file);
    for record in diagram.iter() {
        writeln!(
            writer,
            "{} {}",
            format_value(record.birth),
            format_death(record.death_value())
        )
        .map_err(|e| PairingError::serialization(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| PairingError::serialization(e.to_string()))
}

/// Index-aligned result sequences for callers that expect arrays instead of
/// structured records. Essential records carry `None` in the death columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResultArrays {
    pub birth_values: Vec<f32>,
    pub death_values: Vec<Option<f32>>,
    pub real_birth_values: Vec<f32>,
    pub real_death_values: Vec<Option<f32>>,
    pub birth_ids: Vec<GlobalId>,
    pub death_ids: Vec<Option<GlobalId>>,
}

impl ResultArrays {
    pub fn from_diagram(diagram: &Diagram) -> Self {
        let mut arrays = ResultArrays {
            birth_values: Vec::with_capacity(diagram.len()),
            death_values: Vec::with_capacity(diagram.len()),
            real_birth_values: Vec::with_capacity(diagram.len()),
            real_death_values: Vec::with_capacity(diagram.len()),
            birth_ids: Vec::with_capacity(diagram.len()),
            death_ids: Vec::with_capacity(diagram.len()),
        };
        for record in diagram.iter() {
            arrays.birth_values.push(record.birth);
            arrays.death_values.push(record.death_value());
            arrays.real_birth_values.push(record.real_birth);
            arrays.real_death_values.push(record.real_death());
            arrays.birth_ids.push(record.birth_id);
            arrays.death_ids.push(record.death_id());
        }
        arrays
    }

    pub fn len(&self) -> usize {
        self.birth_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.birth_ids.is_empty()
    }

    pub fn death_values_or(&self, fill: f32) -> Vec<f32> {
        self.death_values.iter().map(|v| v.unwrap_or(fill)).collect()
    }

    pub fn real_death_values_or(&self, fill: f32) -> Vec<f32> {
        self.real_death_values
            .iter()
            .map(|v| v.unwrap_or(fill))
            .collect()
    }

    pub fn death_ids_or(&self, fill: GlobalId) -> Vec<GlobalId> {
        self.death_ids.iter().map(|v| v.unwrap_or(fill)).collect()
    }

    pub fn to_json(&self) -> Result<String, PairingError> {
        serde_json::to_string(self).map_err(|e| PairingError::serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagram::extract,
        vertex::{CriticalKind, Vertex, VertexTable},
    };

    fn sample() -> Diagram {
        let table = VertexTable::new(vec![
            Vertex::new(0, 0.0, 2.5, CriticalKind::Minimum).with_partner(1),
            Vertex::new(1, 1.0, 7.0, CriticalKind::Maximum).with_partner(0),
            Vertex::new(2, 0.5, 4.75, CriticalKind::DownFork),
        ])
        .unwrap();
        extract(&[table])
    }

    #[test]
    fn value_format_keeps_fraction() {
        assert_eq!(format_value(1.0), "1.0");
        assert_eq!(format_value(0.1), "0.1");
        assert_eq!(format_value(-3.25), "-3.25");
        assert_eq!(format_value(0.0), "0.0");
        assert_eq!(format_value(0.001), "0.001");
        assert_eq!(format_value(100.0), "100.0");
        assert_eq!(format_value(1234567.0), "1234567.0");
    }

    #[test]
    fn value_format_switches_to_exponent_outside_decimal_range() {
        assert_eq!(format_value(1e-5), "1.0E-5");
        assert_eq!(format_value(1e-4), "1.0E-4");
        assert_eq!(format_value(1e7), "1.0E7");
        assert_eq!(format_value(12345678.0), "1.2345678E7");
        assert_eq!(format_value(-2.5e-4), "-2.5E-4");
    }

    #[test]
    fn csv_rows_use_exponent_form_for_extreme_values() {
        let table = VertexTable::new(vec![
            Vertex::new(0, 0.0, 0.00001, CriticalKind::Minimum).with_partner(1),
            Vertex::new(1, 1.0, 12345678.0, CriticalKind::Maximum).with_partner(0),
        ])
        .unwrap();
        assert_eq!(csv_lines(&extract(&[table]))[1], "1.0E-5,1.2345678E7,0,1");
    }

    #[test]
    fn csv_uses_real_values_and_markers() {
        assert_eq!(
            to_csv(&sample()),
            "birth_value,death_value,birth_index,death_index\n2.5,7.0,0,1\n4.75,INF,2,-1\n"
        );
    }

    #[test]
    fn write_csv_matches_to_csv() {
        let mut buf = Vec::new();
        write_csv(&sample(), &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), to_csv(&sample()));
    }

    #[test]
    fn intervals_listing() {
        assert_eq!(
            render_intervals(&sample()),
            "  [2.5,7.0) 0/1\n  [4.75,INF) 2/-1\n"
        );
    }

    #[test]
    fn arrays_stay_aligned_for_essentials() {
        let arrays = ResultArrays::from_diagram(&sample());
        assert_eq!(arrays.len(), 2);
        assert_eq!(arrays.death_ids, vec![Some(1), None]);
        assert_eq!(arrays.death_ids_or(-1), vec![1, -1]);
        assert_eq!(arrays.real_death_values_or(f32::NAN)[0], 7.0);
        let json = arrays.to_json().unwrap();
        assert!(json.contains("\"death_ids\":[1,null]"));
    }

    #[test]
    fn birth_death_file_uses_normalized_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagram.txt");
        save_birth_death(&sample(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "0.0 1.0\n0.5 INF\n");
    }
}
