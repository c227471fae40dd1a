//! Terminal rendering of a workflow `Screen`.

use console::style;
use facefind_workflow::{Screen, View};

/// Lines to print for a screen, styled for the terminal.
pub fn lines(screen: &Screen) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(ref notice) = screen.notice {
        out.push(format!("{}", style(format!("! {notice}")).red().bold()));
        out.push(String::new());
    }

    match &screen.view {
        View::Landing { title, subtitle } => {
            out.push(format!("{}", style(title).bold()));
            out.push(format!("{}", style(subtitle).dim()));
        }
        View::LiveCapture { hint, .. } => {
            out.push(format!("{}", style("Camera").cyan().bold()));
            out.push(hint.clone());
        }
        View::Progress { title, label, preview_uri, .. } => {
            out.push(format!("{}", style(title).cyan().bold()));
            out.push(label.clone());
            if let Some(uri) = preview_uri {
                out.push(format!("{}", style(uri).dim()));
            }
        }
        View::Results(results) => {
            out.push(format!("{}", style(&results.headline).green().bold()));
            if let Some(ref confidence) = results.confidence {
                out.push(confidence.clone());
            }
            out.push(String::new());
            for tile in &results.photos {
                out.push(format!("  {}  {}", style(&tile.label).bold(), tile.url));
            }
        }
        View::NoMatches { title, message, hint, .. } => {
            out.push(format!("{}", style(title).yellow().bold()));
            out.push(message.clone());
            out.push(format!("{}", style(hint).dim()));
        }
        View::Error { title, message, .. } => {
            out.push(format!("{}", style(title).red().bold()));
            out.push(message.clone());
        }
    }

    if let Some(ref overlay) = screen.overlay {
        out.push(String::new());
        out.push(format!(
            "{} {}",
            style(format!("Photo {}", overlay.index + 1)).magenta().bold(),
            overlay.url
        ));
    }

    out
}

pub fn print(screen: &Screen) {
    println!();
    for line in lines(screen) {
        println!("{line}");
    }
}

/// Label of the action that leads back to the start, if the view has one.
pub fn reset_action(view: &View) -> Option<&str> {
    match view {
        View::Results(results) => Some(&results.action),
        View::NoMatches { action, .. } | View::Error { action, .. } => Some(action),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facefind_workflow::{PhotoOverlay, PhotoTile, ResultsView};

    fn plain(screen: &Screen) -> Vec<String> {
        lines(screen)
            .iter()
            .map(|l| console::strip_ansi_codes(l).into_owned())
            .collect()
    }

    fn results_screen() -> Screen {
        Screen {
            view: View::Results(ResultsView {
                headline: "Found 2 Photos".into(),
                confidence: Some("Best Match Confidence: 97.0%".into()),
                photos: vec![
                    PhotoTile {
                        label: "Photo 1".into(),
                        url: "https://cdn.example/a.jpg".into(),
                    },
                    PhotoTile {
                        label: "Photo 2".into(),
                        url: "https://cdn.example/b.jpg".into(),
                    },
                ],
                action: "Search Again".into(),
            }),
            overlay: None,
            notice: None,
        }
    }

    #[test]
    fn results_list_every_photo() {
        let out = plain(&results_screen());
        assert_eq!(out[0], "Found 2 Photos");
        assert_eq!(out[1], "Best Match Confidence: 97.0%");
        assert!(out.contains(&"  Photo 2  https://cdn.example/b.jpg".to_string()));
    }

    #[test]
    fn overlay_is_printed_last() {
        let mut screen = results_screen();
        screen.overlay = Some(PhotoOverlay {
            index: 1,
            url: "https://cdn.example/b.jpg".into(),
        });
        let out = plain(&screen);
        assert_eq!(out.last().unwrap(), "Photo 2 https://cdn.example/b.jpg");
    }

    #[test]
    fn notice_comes_first() {
        let screen = Screen {
            view: View::Landing {
                title: "Find Your Photos".into(),
                subtitle: "Take a selfie".into(),
            },
            overlay: None,
            notice: Some("Camera access denied".into()),
        };
        let out = plain(&screen);
        assert_eq!(out[0], "! Camera access denied");
        assert_eq!(out[2], "Find Your Photos");
    }

    #[test]
    fn reset_action_labels() {
        assert_eq!(reset_action(&results_screen().view), Some("Search Again"));
        let error = View::Error {
            title: "Something went wrong".into(),
            message: "Processing failed".into(),
            action: "Try Again".into(),
        };
        assert_eq!(reset_action(&error), Some("Try Again"));
        let landing = View::Landing {
            title: String::new(),
            subtitle: String::new(),
        };
        assert_eq!(reset_action(&landing), None);
    }
}
