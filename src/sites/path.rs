//! Absolute structural paths such as `/html/body/div[1]/main/h1`.
//!
//! Only the subset needed to address a node by tag names and 1-based
//! positions among same-tag siblings is supported. A step without a position
//! matches every same-tag child.

use scraper::{ElementRef, Html};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    tag: String,
    position: Option<usize>,
}

/// A parsed absolute element path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralPath {
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("Path must be absolute (start with '/'): {0}")]
    NotAbsolute(String),
    #[error("Empty step in path: {0}")]
    EmptyStep(String),
    #[error("Invalid position in step '{0}' (positions start at 1)")]
    InvalidPosition(String),
}

impl StructuralPath {
    /// Returns the first element the path addresses in `document`.
    pub fn select_first<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        let mut current: Vec<ElementRef<'a>> =
            document.tree.root().children().filter_map(ElementRef::wrap).collect();

        for (depth, step) in self.steps.iter().enumerate() {
            let candidates: Vec<ElementRef<'a>> = if depth == 0 {
                current.into_iter().filter(|e| e.value().name() == step.tag).collect()
            } else {
                current
                    .iter()
                    .flat_map(|parent| {
                        let same_tag = parent
                            .children()
                            .filter_map(ElementRef::wrap)
                            .filter(|e| e.value().name() == step.tag);
                        match step.position {
                            Some(n) => same_tag.skip(n - 1).take(1).collect::<Vec<_>>(),
                            None => same_tag.collect(),
                        }
                    })
                    .collect()
            };

            current = match (depth, step.position) {
                (0, Some(n)) => candidates.into_iter().skip(n - 1).take(1).collect(),
                _ => candidates,
            };

            if current.is_empty() {
                return None;
            }
        }

        current.into_iter().next()
    }
}

impl FromStr for StructuralPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.trim().strip_prefix('/').ok_or_else(|| PathParseError::NotAbsolute(s.into()))?;

        let steps = rest
            .split('/')
            .map(|segment| {
                if segment.is_empty() {
                    return Err(PathParseError::EmptyStep(s.to_string()));
                }

                match segment.split_once('[') {
                    Some((tag, index)) => {
                        let position = index
                            .strip_suffix(']')
                            .and_then(|n| n.parse::<usize>().ok())
                            .filter(|n| *n >= 1)
                            .ok_or_else(|| PathParseError::InvalidPosition(segment.into()))?;
                        Ok(Step { tag: tag.to_lowercase(), position: Some(position) })
                    }
                    None => Ok(Step { tag: segment.to_lowercase(), position: None }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { steps })
    }
}

impl fmt::Display for StructuralPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            match step.position {
                Some(n) => write!(f, "/{}[{}]", step.tag, n)?,
                None => write!(f, "/{}", step.tag)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div id="first"><span>one</span></div>
        <div id="second">
            <main>
                <p>a</p>
                <p>b</p>
                <h1>Title</h1>
            </main>
        </div>
    </body></html>"#;

    fn text_at(path: &str) -> Option<String> {
        let document = Html::parse_document(PAGE);
        let path: StructuralPath = path.parse().unwrap();
        path.select_first(&document).map(|e| e.text().collect::<String>())
    }

    #[test]
    fn test_positional_steps() {
        assert_eq!(text_at("/html/body/div[1]/span"), Some("one".to_string()));
        assert_eq!(text_at("/html/body/div[2]/main/p[2]"), Some("b".to_string()));
        assert_eq!(text_at("/html/body/div[2]/main/h1"), Some("Title".to_string()));
    }

    #[test]
    fn test_unpositioned_step_matches_any_sibling() {
        // div without a position searches both divs; only the second has a main
        assert_eq!(text_at("/html/body/div/main/h1"), Some("Title".to_string()));
        assert_eq!(text_at("/html/body/div/main/p"), Some("a".to_string()));
    }

    #[test]
    fn test_missing_nodes() {
        assert_eq!(text_at("/html/body/div[3]"), None);
        assert_eq!(text_at("/html/body/div[1]/main"), None);
        assert_eq!(text_at("/html/head/title"), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("html/body".parse::<StructuralPath>(), Err(PathParseError::NotAbsolute(_))));
        assert!(matches!("/html//body".parse::<StructuralPath>(), Err(PathParseError::EmptyStep(_))));
        assert!(matches!(
            "/html/body/div[0]".parse::<StructuralPath>(),
            Err(PathParseError::InvalidPosition(_))
        ));
        assert!(matches!(
            "/html/body/div[x]".parse::<StructuralPath>(),
            Err(PathParseError::InvalidPosition(_))
        ));
    }

    #[test]
    fn test_display_roundtrip() {
        let raw = "/html/body/div[1]/div/main/div[2]/h1";
        let path: StructuralPath = raw.parse().unwrap();
        assert_eq!(path.to_string(), raw);
    }
}
