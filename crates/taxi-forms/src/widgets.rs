//! Widgets: how a form field is presented and read back.
//!
//! HTML rendering is left to the presentation layer. A [`WidgetType`]
//! still decides how a field's value is pulled out of submitted data,
//! since a checkbox group submits one pair per ticked box while a text
//! input submits a single value.

use std::fmt;

use taxi_http::QueryDict;

/// The built-in widget types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetType {
    /// `<input type="text">`.
    TextInput,
    /// `<input type="password">`. Submitted values are never redisplayed.
    PasswordInput,
    /// `<input type="email">`.
    EmailInput,
    /// `<input type="number">`.
    NumberInput,
    /// `<input type="checkbox">`.
    CheckboxInput,
    /// `<select>`.
    Select,
    /// `<select multiple>`.
    SelectMultiple,
    /// A group of `<input type="checkbox">` elements, one per choice.
    CheckboxSelectMultiple,
    /// `<input type="hidden">`.
    HiddenInput,
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TextInput => "TextInput",
            Self::PasswordInput => "PasswordInput",
            Self::EmailInput => "EmailInput",
            Self::NumberInput => "NumberInput",
            Self::CheckboxInput => "CheckboxInput",
            Self::Select => "Select",
            Self::SelectMultiple => "SelectMultiple",
            Self::CheckboxSelectMultiple => "CheckboxSelectMultiple",
            Self::HiddenInput => "HiddenInput",
        };
        write!(f, "{name}")
    }
}

impl WidgetType {
    /// Returns `true` if the widget submits several values under one name.
    pub const fn allows_multiple(self) -> bool {
        matches!(self, Self::SelectMultiple | Self::CheckboxSelectMultiple)
    }

    /// Extracts the submitted value(s) for `name` from `data`.
    ///
    /// Multi-value widgets return every submitted value in order. Other
    /// widgets return the last value. An empty vector means the key was
    /// not submitted at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use taxi_forms::WidgetType;
    /// use taxi_http::QueryDict;
    ///
    /// let data = QueryDict::parse("drivers=2&drivers=5&model=Leaf");
    /// assert_eq!(
    ///     WidgetType::CheckboxSelectMultiple.value_from_data(&data, "drivers"),
    ///     vec!["2".to_string(), "5".to_string()],
    /// );
    /// assert_eq!(WidgetType::TextInput.value_from_data(&data, "model"), vec!["Leaf".to_string()]);
    /// assert!(WidgetType::TextInput.value_from_data(&data, "country").is_empty());
    /// ```
    pub fn value_from_data(self, data: &QueryDict, name: &str) -> Vec<String> {
        if self.allows_multiple() {
            return data.get_list(name).map(<[String]>::to_vec).unwrap_or_default();
        }
        data.get(name).map(|v| vec![v.to_string()]).unwrap_or_default()
    }
}
