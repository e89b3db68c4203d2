use serde::{Deserialize, Serialize};

/// Named per-frame indicators accumulated across pipeline stages.
///
/// `None` means the stage that owns the indicator has not run (or did not
/// decide); merging lets later stages override earlier values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Flags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_contour_failed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shock_contour_failed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underexposed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overexposed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dim_shock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_visible: Option<bool>,
}

impl Flags {
    /// Overlay every indicator that `other` has set.
    pub fn merge(&mut self, other: &Flags) {
        fn take(dst: &mut Option<bool>, src: Option<bool>) {
            if src.is_some() {
                *dst = src;
            }
        }
        take(&mut self.model_contour_failed, other.model_contour_failed);
        take(&mut self.shock_contour_failed, other.shock_contour_failed);
        take(&mut self.underexposed, other.underexposed);
        take(&mut self.overexposed, other.overexposed);
        take(&mut self.dim_shock, other.dim_shock);
        take(&mut self.model_visible, other.model_visible);
    }

    pub fn merged(mut self, other: &Flags) -> Flags {
        self.merge(other);
        self
    }

    pub fn is_underexposed(&self) -> bool {
        self.underexposed.unwrap_or(false)
    }

    pub fn is_overexposed(&self) -> bool {
        self.overexposed.unwrap_or(false)
    }

    pub fn model_failed(&self) -> bool {
        self.model_contour_failed.unwrap_or(false)
    }

    pub fn shock_failed(&self) -> bool {
        self.shock_contour_failed.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overrides_only_set_values() {
        let mut base = Flags {
            underexposed: Some(true),
            dim_shock: Some(false),
            ..Flags::default()
        };
        base.merge(&Flags {
            dim_shock: Some(true),
            model_contour_failed: Some(false),
            ..Flags::default()
        });
        assert_eq!(base.underexposed, Some(true));
        assert_eq!(base.dim_shock, Some(true));
        assert_eq!(base.model_contour_failed, Some(false));
        assert_eq!(base.overexposed, None);
    }

    #[test]
    fn unset_flags_are_omitted() {
        let flags = Flags {
            shock_contour_failed: Some(true),
            ..Flags::default()
        };
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, r#"{"SHOCK_CONTOUR_FAILED":true}"#);
    }
}
