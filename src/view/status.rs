use std::collections::HashMap;

use crate::nls::Messages;
use crate::travis::{JobStatus, KEY};

/// Color and icon classes of one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusStyle {
    pub color: String,
    pub icon: String,
}

impl StatusStyle {
    fn new(color: &str, icon: &str) -> Self {
        Self {
            color: color.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// Classes of the job status icons, by status.
///
/// Statuses missing from the table use the neutral fallback, so every
/// status gets a non-empty class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusStyles {
    styles: HashMap<JobStatus, StatusStyle>,
    fallback: StatusStyle,
    building_icon: String,
    /// Icon of pending feedback
    spinner: String,
    /// Icon of the build button
    play: String,
    /// Font stylesheet providing the classes
    stylesheet: &'static str,
    /// Style class every named icon carries
    prefix: &'static str,
}

impl StatusStyles {
    /// Font Awesome 4 class names.
    pub fn font_awesome_4() -> Self {
        Self {
            styles: HashMap::from([
                (JobStatus::Blue, StatusStyle::new("text-success", "fa fa-circle")),
                (JobStatus::Red, StatusStyle::new("text-danger", "fa fa-circle")),
                (JobStatus::Disabled, StatusStyle::new("text-muted", "fa fa-ban")),
                (JobStatus::Yellow, StatusStyle::new("text-warning", "fa fa-circle")),
            ]),
            fallback: StatusStyle::new("text-muted", "fa fa-circle"),
            building_icon: "fa fa-refresh fa-spin".to_string(),
            spinner: "fa fa-refresh fa-spin".to_string(),
            play: "fa fa-play".to_string(),
            stylesheet: "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/4.7.0/css/font-awesome.min.css",
            prefix: "fa",
        }
    }

    /// Font Awesome 5 class names.
    pub fn font_awesome_5() -> Self {
        Self {
            styles: HashMap::from([
                (JobStatus::Blue, StatusStyle::new("text-success", "fas fa-circle")),
                (JobStatus::Red, StatusStyle::new("text-danger", "fas fa-circle")),
                (JobStatus::Disabled, StatusStyle::new("text-muted", "fas fa-ban")),
                (JobStatus::Yellow, StatusStyle::new("text-warning", "fas fa-circle")),
            ]),
            fallback: StatusStyle::new("text-muted", "fas fa-circle"),
            building_icon: "fas fa-sync fa-spin".to_string(),
            spinner: "fas fa-sync fa-spin".to_string(),
            play: "fas fa-play".to_string(),
            stylesheet: "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/5.15.4/css/all.min.css",
            prefix: "fas",
        }
    }

    pub fn from_icon_set(name: &str) -> Option<Self> {
        match name {
            "fa4" => Some(Self::font_awesome_4()),
            "fa5" => Some(Self::font_awesome_5()),
            _ => None,
        }
    }

    pub fn color(&self, status: &JobStatus) -> &str {
        self.styles
            .get(status)
            .map(|s| s.color.as_str())
            .unwrap_or(self.fallback.color.as_str())
    }

    pub fn icon(&self, status: &JobStatus, building: bool) -> &str {
        if building {
            return &self.building_icon;
        }
        self.styles
            .get(status)
            .map(|s| s.icon.as_str())
            .unwrap_or(self.fallback.icon.as_str())
    }

    pub fn class(&self, status: &JobStatus, building: bool) -> String {
        format!("{} {}", self.color(status), self.icon(status, building))
    }

    pub fn spinner(&self) -> &str {
        &self.spinner
    }

    pub fn play(&self) -> &str {
        &self.play
    }

    pub fn stylesheet(&self) -> &'static str {
        self.stylesheet
    }

    /// Classes of the icon `name` (`home`, `check`, ...) in this set.
    pub fn named(&self, name: &str) -> String {
        format!("{} fa-{}", self.prefix, name)
    }
}

impl Default for StatusStyles {
    fn default() -> Self {
        Self::font_awesome_4()
    }
}

/// Tooltip and class of a job status icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPresentation {
    pub title: String,
    pub class: String,
}

/// The title is the localized status, or the raw status when it has no
/// label, followed by the building label while a build runs.
pub fn status_presentation(
    messages: &Messages,
    styles: &StatusStyles,
    status: &JobStatus,
    building: bool,
) -> StatusPresentation {
    let mut title = messages
        .get(&format!("{}:status-{}", KEY, status.as_str()))
        .unwrap_or(status.as_str())
        .to_string();
    if building {
        title.push_str(&format!(
            " ({})",
            messages.label(&format!("{}:building", KEY))
        ));
    }

    StatusPresentation {
        title,
        class: styles.class(status, building),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nls::Locale;

    const COLORS: [&str; 4] = ["text-success", "text-danger", "text-muted", "text-warning"];

    fn known() -> [JobStatus; 4] {
        [
            JobStatus::Blue,
            JobStatus::Red,
            JobStatus::Yellow,
            JobStatus::Disabled,
        ]
    }

    #[test]
    fn every_known_status_has_one_color_and_one_icon() {
        let messages = Messages::root();
        let styles = StatusStyles::default();
        for status in known() {
            for building in [false, true] {
                let p = status_presentation(&messages, &styles, &status, building);
                assert!(!p.class.is_empty());
                let colors = p
                    .class
                    .split_whitespace()
                    .filter(|t| COLORS.contains(t))
                    .count();
                assert_eq!(colors, 1, "{:?}", p);
                let icons = p
                    .class
                    .split_whitespace()
                    .filter(|t| ["fa-circle", "fa-ban", "fa-refresh"].contains(t))
                    .count();
                assert_eq!(icons, 1, "{:?}", p);
                assert_eq!(p.class.contains("fa-spin"), building, "{:?}", p);
                assert_eq!(p.title.contains("(Building)"), building, "{:?}", p);
            }
        }
    }

    #[test]
    fn unknown_status_falls_back_to_neutral_style_and_raw_title() {
        let messages = Messages::root();
        let styles = StatusStyles::default();
        let status = JobStatus::from("aborted");

        let p = status_presentation(&messages, &styles, &status, false);
        assert_eq!(p.title, "aborted");
        assert_eq!(p.class, "text-muted fa fa-circle");

        let p = status_presentation(&messages, &styles, &status, true);
        assert_eq!(p.title, "aborted (Building)");
        assert_eq!(p.class, "text-muted fa fa-refresh fa-spin");

        let p = status_presentation(&messages, &styles, &JobStatus::from(""), false);
        assert_eq!(p.class, "text-muted fa fa-circle");
    }

    #[test]
    fn unstable_building_job() {
        let p = status_presentation(
            &Messages::root(),
            &StatusStyles::default(),
            &JobStatus::Yellow,
            true,
        );
        assert_eq!(p.title, "Unstable (Building)");
        assert_eq!(p.class, "text-warning fa fa-refresh fa-spin");

        let p = status_presentation(
            &Messages::new(Locale::Fr),
            &StatusStyles::font_awesome_5(),
            &JobStatus::Yellow,
            true,
        );
        assert_eq!(p.title, "Instable (En construction)");
        assert_eq!(p.class, "text-warning fas fa-sync fa-spin");
    }

    #[test]
    fn disabled_job_uses_ban_icon() {
        let styles = StatusStyles::default();
        assert_eq!(styles.class(&JobStatus::Disabled, false), "text-muted fa fa-ban");
        assert_eq!(StatusStyles::from_icon_set("fa5").map(|s| s.class(&JobStatus::Red, false)),
            Some("text-danger fas fa-circle".to_string()));
    }

    #[test]
    fn named_icons_follow_the_icon_set() {
        assert_eq!(StatusStyles::font_awesome_4().named("home"), "fa fa-home");
        assert_eq!(StatusStyles::font_awesome_5().named("check"), "fas fa-check");
    }
}
