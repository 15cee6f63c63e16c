//! A keyboard-driven parameter panel.
//!
//! Lessons describe their tweakables once (floats with a range and step,
//! toggles, colours and actions) and the shell maps keys onto them: Tab picks
//! the next parameter, arrows adjust it and Enter toggles or triggers it. Every
//! effective change comes back as a [`ParamChange`] for the app to react to.

use crate::math::color::Color;

#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Bool(bool),
    Color(u32),
    Action,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamChange {
    pub name: String,
    pub value: ParamValue,
}

#[derive(Clone, Debug, PartialEq)]
enum ParamKind {
    Float {
        value: f32,
        min: f32,
        max: f32,
        step: f32,
    },
    Bool(bool),
    Color(u32),
    Action,
}

#[derive(Clone, Debug, PartialEq)]
struct Param {
    name: String,
    label: String,
    kind: ParamKind,
}

/// Ordered set of parameters with one selected entry.
#[derive(Clone, Debug, Default)]
pub struct Params {
    params: Vec<Param>,
    selected: usize,
    folder: Option<String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Following `add_*` calls are grouped under `name` in their label.
    pub fn folder(&mut self, name: impl Into<String>) -> &mut Self {
        self.folder = Some(name.into());
        self
    }

    pub fn end_folder(&mut self) -> &mut Self {
        self.folder = None;
        self
    }

    fn push(&mut self, name: &str, kind: ParamKind) -> &mut Self {
        let label = match &self.folder {
            Some(folder) => format!("{}/{}", folder, name),
            None => name.to_string(),
        };
        self.params.push(Param {
            name: name.to_string(),
            label,
            kind,
        });
        self
    }

    pub fn add_float(&mut self, name: &str, value: f32, min: f32, max: f32, step: f32) -> &mut Self {
        let value = snap(value, min, max, step);
        self.push(
            name,
            ParamKind::Float {
                value,
                min,
                max,
                step,
            },
        )
    }

    pub fn add_bool(&mut self, name: &str, value: bool) -> &mut Self {
        self.push(name, ParamKind::Bool(value))
    }

    pub fn add_color(&mut self, name: &str, hex: u32) -> &mut Self {
        self.push(name, ParamKind::Color(hex & 0xffffff))
    }

    pub fn add_action(&mut self, name: &str) -> &mut Self {
        self.push(name, ParamKind::Action)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.params.get(self.selected).map(|p| p.name.as_str())
    }

    pub fn select_next(&mut self) {
        if !self.params.is_empty() {
            self.selected = (self.selected + 1) % self.params.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.params.is_empty() {
            self.selected = (self.selected + self.params.len() - 1) % self.params.len();
        }
    }

    /// Step the selected parameter by `direction` (positive or negative).
    ///
    /// Floats move by one step and are clamped, booleans flip and colours
    /// rotate their hue by 1/24th of a turn. Returns `None` when nothing
    /// changed, e.g. at the end of a range.
    pub fn adjust(&mut self, direction: i32) -> Option<ParamChange> {
        let param = self.params.get_mut(self.selected)?;
        let value = match &mut param.kind {
            ParamKind::Float {
                value,
                min,
                max,
                step,
            } => {
                let next = snap(*value + *step * direction.signum() as f32, *min, *max, *step);
                if next == *value {
                    return None;
                }
                *value = next;
                ParamValue::Float(next)
            }
            ParamKind::Bool(value) => {
                *value = !*value;
                ParamValue::Bool(*value)
            }
            ParamKind::Color(hex) => {
                let (h, s, l) = Color::from_hex(*hex).to_hsl();
                let h = (h + direction.signum() as f32 / 24.0).rem_euclid(1.0);
                let next = Color::from_hsl(h, s, l).to_hex();
                // greys have no hue to turn
                if next == *hex {
                    return None;
                }
                *hex = next;
                ParamValue::Color(next)
            }
            ParamKind::Action => return None,
        };
        Some(ParamChange {
            name: param.name.clone(),
            value,
        })
    }

    /// Toggle a boolean or trigger an action.
    pub fn activate(&mut self) -> Option<ParamChange> {
        let param = self.params.get_mut(self.selected)?;
        let value = match &mut param.kind {
            ParamKind::Bool(value) => {
                *value = !*value;
                ParamValue::Bool(*value)
            }
            ParamKind::Action => ParamValue::Action,
            _ => return None,
        };
        Some(ParamChange {
            name: param.name.clone(),
            value,
        })
    }

    fn find(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Param> {
        self.params.iter_mut().find(|p| p.name == name)
    }

    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.find(name)?.kind {
            ParamKind::Float { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.find(name)?.kind {
            ParamKind::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_color(&self, name: &str) -> Option<u32> {
        match self.find(name)?.kind {
            ParamKind::Color(hex) => Some(hex),
            _ => None,
        }
    }

    /// Set a float without emitting a change.
    pub fn set_f32(&mut self, name: &str, new_value: f32) {
        if let Some(Param {
            kind: ParamKind::Float {
                value, min, max, ..
            },
            ..
        }) = self.find_mut(name)
        {
            *value = new_value.clamp(*min, *max);
        }
    }

    pub fn set_bool(&mut self, name: &str, new_value: bool) {
        if let Some(Param {
            kind: ParamKind::Bool(value),
            ..
        }) = self.find_mut(name)
        {
            *value = new_value;
        }
    }

    pub fn set_color(&mut self, name: &str, new_value: u32) {
        if let Some(Param {
            kind: ParamKind::Color(value),
            ..
        }) = self.find_mut(name)
        {
            *value = new_value & 0xff_ffff;
        }
    }

    /// One-line description of the selection, shown in the window title.
    pub fn summary(&self) -> Option<String> {
        let param = self.params.get(self.selected)?;
        let value = match &param.kind {
            ParamKind::Float { value, .. } => format!("{:.3}", value),
            ParamKind::Bool(value) => (if *value { "on" } else { "off" }).to_string(),
            ParamKind::Color(hex) => format!("#{:06x}", hex),
            ParamKind::Action => "press Enter".to_string(),
        };
        Some(format!(
            "[{}/{}] {}: {}",
            self.selected + 1,
            self.params.len(),
            param.label,
            value
        ))
    }
}

/// Clamp to the range and round to the nearest multiple of `step` from `min`.
fn snap(value: f32, min: f32, max: f32, step: f32) -> f32 {
    let value = value.clamp(min, max);
    if step <= 0.0 {
        return value;
    }
    let steps = ((value - min) / step).round();
    (min + steps * step).clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> Params {
        let mut params = Params::new();
        params
            .add_float("cubes", 20.0, 1.0, 50.0, 1.0)
            .folder("Material")
            .add_bool("wireframe", false)
            .add_color("color", 0x336699)
            .end_folder()
            .add_action("spin");
        params
    }

    #[test]
    fn floats_step_and_clamp() {
        let mut params = panel();
        assert_eq!(
            params.adjust(1),
            Some(ParamChange {
                name: "cubes".into(),
                value: ParamValue::Float(21.0)
            })
        );
        for _ in 0..100 {
            params.adjust(1);
        }
        assert_eq!(params.get_f32("cubes"), Some(50.0));
        // already at the upper bound
        assert_eq!(params.adjust(1), None);
        params.adjust(-1);
        assert_eq!(params.get_f32("cubes"), Some(49.0));
    }

    #[test]
    fn snapping_keeps_values_on_the_grid() {
        assert!((snap(0.26, 0.0, 10.0, 0.1) - 0.3).abs() < 1e-6);
        assert_eq!(snap(-4.0, 0.0, 10.0, 0.1), 0.0);
        assert_eq!(snap(42.0, 0.0, 10.0, 0.1), 10.0);
        assert_eq!(snap(0.123, 0.0, 1.0, 0.0), 0.123);
    }

    #[test]
    fn selection_wraps_and_toggles() {
        let mut params = panel();
        params.select_prev();
        assert_eq!(params.selected_name(), Some("spin"));
        assert_eq!(
            params.activate(),
            Some(ParamChange {
                name: "spin".into(),
                value: ParamValue::Action
            })
        );
        params.select_next();
        params.select_next();
        assert_eq!(params.selected_name(), Some("wireframe"));
        assert_eq!(params.activate().unwrap().value, ParamValue::Bool(true));
        assert_eq!(params.get_bool("wireframe"), Some(true));
        assert_eq!(params.summary().unwrap(), "[2/4] Material/wireframe: on");
    }

    #[test]
    fn colours_rotate_their_hue() {
        let mut params = panel();
        params.select_next();
        params.select_next();
        let change = params.adjust(1).unwrap();
        match change.value {
            ParamValue::Color(hex) => assert_ne!(hex, 0x336699),
            other => panic!("unexpected value {:?}", other),
        }
        assert_ne!(params.get_color("color"), Some(0x336699));
    }

    #[test]
    fn hue_turns_keep_saturation_and_lightness() {
        let mut params = panel();
        params.select_next();
        params.select_next();
        // dark and saturated, then light and muted
        for start in [0x401008, 0x807870] {
            params.set_color("color", start);
            params.adjust(1).unwrap();
            let (h0, s0, l0) = Color::from_hex(start).to_hsl();
            let (h, s, l) = Color::from_hex(params.get_color("color").unwrap()).to_hsl();
            assert!((h - h0).abs() > 0.02, "hue of #{:06x} did not move", start);
            assert!((s - s0).abs() < 0.05, "saturation {} drifted from {}", s, s0);
            assert!((l - l0).abs() < 0.01, "lightness {} drifted from {}", l, l0);
        }

        params.set_color("color", 0x808080);
        assert_eq!(params.adjust(1), None);
        assert_eq!(params.get_color("color"), Some(0x808080));
    }

    #[test]
    fn silent_setters_do_not_touch_other_kinds() {
        let mut params = panel();
        params.set_f32("cubes", 500.0);
        assert_eq!(params.get_f32("cubes"), Some(50.0));
        params.set_f32("wireframe", 1.0);
        assert_eq!(params.get_bool("wireframe"), Some(false));
        params.set_bool("wireframe", true);
        assert_eq!(params.get_bool("wireframe"), Some(true));
        params.set_color("color", 0x12abcdef);
        assert_eq!(params.get_color("color"), Some(0xabcdef));
        params.set_color("cubes", 0xffffff);
        assert_eq!(params.get_f32("cubes"), Some(50.0));
        assert_eq!(params.get_f32("missing"), None);
    }
}
