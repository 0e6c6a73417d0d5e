//! # Pipeline Config
//!
//! Declarative description of a `Pipeline<String>`.
//!
//! Two input forms build the same [`PipelineConfig`]:
//!
//! ```toml
//! [[stages]]
//! kind = "strip-control"
//!
//! [[stages]]
//! kind = "expand-tabs"
//! spaces = 8
//!
//! [[stages]]
//! kind = "pipeline"
//! stages = [{ kind = "uppercase" }, { kind = "print", prefix = ">> " }]
//! ```
//!
//! and compact `kind[:arg]` strings: `strip-control`, `expand-tabs:8`,
//! `print:>> `.

use crate::primitives::{
    DEFAULT_PRINT_PREFIX, DEFAULT_SPACES_PER_TAB, MAX_NESTING_DEPTH, MAX_SPACES_PER_TAB,
};
use crate::transform::{ExpandTabs, Identity, Inspect, StripControlChars, Uppercase};
use crate::{Pipeline, PipelineError, Sink, Stage, Transform, Transit};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::str::FromStr;

/// Receives the formatted lines produced by print-style stages.
pub type Observer = Rc<dyn Fn(&str)>;

/// Stage kinds accepted by the config layer, with a one-line description.
pub const STAGE_KINDS: &[(&str, &str)] = &[
    ("identity", "forward items unchanged"),
    ("uppercase", "uppercase every item"),
    (
        "strip-control",
        "delete C0 control characters except tab, LF and CR",
    ),
    ("expand-tabs[:N]", "replace each tab with N spaces (default 4)"),
    ("print[:PREFIX]", "report each item to the observer, then forward it"),
    ("sink-print[:PREFIX]", "report each item to the observer, then drop it"),
    ("discard", "drop every item"),
    ("buffer", "unbounded FIFO queue"),
    ("split-lines", "split text chunks into lines, flushing the rest at eof"),
    ("pipeline", "nested stage list (config files only)"),
];

fn default_spaces() -> usize {
    DEFAULT_SPACES_PER_TAB
}

fn default_prefix() -> String {
    DEFAULT_PRINT_PREFIX.to_string()
}

// =============================================================================
// STAGE SPEC
// =============================================================================

/// Description of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", from = "StageTable")]
pub enum StageSpec {
    Identity,
    Uppercase,
    StripControl,
    ExpandTabs { spaces: usize },
    Print { prefix: String },
    SinkPrint { prefix: String },
    Discard,
    Buffer,
    SplitLines,
    Pipeline { stages: Vec<StageSpec> },
}

/// Wire form of [`StageSpec`].
///
/// Every kind is a struct variant so unknown keys are rejected for
/// argument-less kinds too.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
enum StageTable {
    Identity {},
    Uppercase {},
    StripControl {},
    ExpandTabs {
        #[serde(default = "default_spaces")]
        spaces: usize,
    },
    Print {
        #[serde(default = "default_prefix")]
        prefix: String,
    },
    SinkPrint {
        #[serde(default = "default_prefix")]
        prefix: String,
    },
    Discard {},
    Buffer {},
    SplitLines {},
    Pipeline {
        #[serde(default)]
        stages: Vec<StageSpec>,
    },
}

impl From<StageTable> for StageSpec {
    fn from(table: StageTable) -> Self {
        match table {
            StageTable::Identity {} => Self::Identity,
            StageTable::Uppercase {} => Self::Uppercase,
            StageTable::StripControl {} => Self::StripControl,
            StageTable::ExpandTabs { spaces } => Self::ExpandTabs { spaces },
            StageTable::Print { prefix } => Self::Print { prefix },
            StageTable::SinkPrint { prefix } => Self::SinkPrint { prefix },
            StageTable::Discard {} => Self::Discard,
            StageTable::Buffer {} => Self::Buffer,
            StageTable::SplitLines {} => Self::SplitLines,
            StageTable::Pipeline { stages } => Self::Pipeline { stages },
        }
    }
}

impl StageSpec {
    /// Check value ranges and nesting depth.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.validate_at(0)
    }

    fn validate_at(&self, depth: usize) -> Result<(), PipelineError> {
        match self {
            Self::ExpandTabs { spaces } if *spaces == 0 || *spaces > MAX_SPACES_PER_TAB => {
                Err(PipelineError::InvalidConfig(format!(
                    "expand-tabs spaces must be in 1..={}, got {}",
                    MAX_SPACES_PER_TAB, spaces
                )))
            }
            Self::Pipeline { stages } => {
                if depth >= MAX_NESTING_DEPTH {
                    return Err(PipelineError::InvalidConfig(format!(
                        "pipelines nested deeper than {}",
                        MAX_NESTING_DEPTH
                    )));
                }
                for stage in stages {
                    stage.validate_at(depth + 1)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Create the stage. Print-style stages report to `observer`.
    ///
    /// Call [`StageSpec::validate`] first; out-of-range values are not
    /// rechecked here.
    pub fn build(&self, observer: &Observer) -> Box<dyn Stage<String>> {
        match self {
            Self::Identity => transit(Identity),
            Self::Uppercase => transit(Uppercase),
            Self::StripControl => transit(StripControlChars::new()),
            Self::ExpandTabs { spaces } => transit(ExpandTabs::new(*spaces)),
            Self::Print { prefix } => {
                let report = reporter(prefix.clone(), Rc::clone(observer));
                transit(Inspect::new(move |item: &String| report(item)))
            }
            Self::SinkPrint { prefix } => {
                let report = reporter(prefix.clone(), Rc::clone(observer));
                Box::new(Sink::<String, _>::with_observer(move |item: &String| {
                    report(item);
                }))
            }
            Self::Discard => Box::new(Sink::<String>::discard()),
            Self::Buffer => Box::new(crate::Buffer::<String>::new()),
            Self::SplitLines => Box::new(crate::SplitLines::new()),
            Self::Pipeline { stages } => Box::new(build_pipeline(stages, observer)),
        }
    }
}

fn transit<X: Transform<String> + 'static>(transform: X) -> Box<dyn Stage<String>> {
    Box::new(Transit::<String, X>::new(transform))
}

fn reporter(prefix: String, observer: Observer) -> impl Fn(&String) {
    move |item: &String| observer(&format!("{prefix}\"{item}\""))
}

fn build_pipeline(specs: &[StageSpec], observer: &Observer) -> Pipeline<String> {
    Pipeline::new(specs.iter().map(|spec| spec.build(observer)).collect())
}

impl FromStr for StageSpec {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg)),
            None => (s.trim(), None),
        };

        let no_arg = |spec: StageSpec| match arg {
            None => Ok(spec),
            Some(_) => Err(PipelineError::InvalidConfig(format!(
                "stage '{}' takes no argument",
                name
            ))),
        };

        let spec = match name {
            "identity" => no_arg(Self::Identity)?,
            "uppercase" => no_arg(Self::Uppercase)?,
            "strip-control" => no_arg(Self::StripControl)?,
            "discard" => no_arg(Self::Discard)?,
            "buffer" => no_arg(Self::Buffer)?,
            "split-lines" => no_arg(Self::SplitLines)?,
            "expand-tabs" => {
                let spaces = match arg {
                    Some(n) => n.trim().parse().map_err(|_| {
                        PipelineError::InvalidConfig(format!("invalid tab width '{}'", n))
                    })?,
                    None => DEFAULT_SPACES_PER_TAB,
                };
                Self::ExpandTabs { spaces }
            }
            "print" => Self::Print {
                prefix: arg.map_or_else(default_prefix, str::to_string),
            },
            "sink-print" => Self::SinkPrint {
                prefix: arg.map_or_else(default_prefix, str::to_string),
            },
            "pipeline" => {
                return Err(PipelineError::InvalidConfig(
                    "nested pipelines can only be declared in a config file".to_string(),
                ));
            }
            other => {
                return Err(PipelineError::InvalidConfig(format!(
                    "unknown stage kind '{}'",
                    other
                )));
            }
        };

        spec.validate()?;
        Ok(spec)
    }
}

// =============================================================================
// PIPELINE CONFIG
// =============================================================================

/// Ordered stage list describing a `Pipeline<String>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub stages: Vec<StageSpec>,
}

impl PipelineConfig {
    /// Create a config from a stage list.
    #[must_use]
    pub fn new(stages: Vec<StageSpec>) -> Self {
        Self { stages }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, PipelineError> {
        let config: Self =
            toml::from_str(source).map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse compact `kind[:arg]` stage strings, in order.
    pub fn from_compact<I, S>(specs: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stages = specs
            .into_iter()
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<StageSpec>, _>>()?;
        Ok(Self { stages })
    }

    /// Append the stages of another config.
    pub fn extend(&mut self, other: PipelineConfig) {
        self.stages.extend(other.stages);
    }

    /// Insert a stage at the head.
    pub fn prepend(&mut self, spec: StageSpec) {
        self.stages.insert(0, spec);
    }

    /// Check every stage.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for stage in &self.stages {
            stage.validate()?;
        }
        Ok(())
    }

    /// Validate, then create the pipeline.
    pub fn build(&self, observer: &Observer) -> Result<Pipeline<String>, PipelineError> {
        self.validate()?;
        Ok(build_pipeline(&self.stages, observer))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StageState;
    use std::cell::RefCell;

    fn quiet() -> Observer {
        Rc::new(|_: &str| {})
    }

    fn run(config: &PipelineConfig, items: &[&str]) -> Vec<String> {
        let mut pipeline = config.build(&quiet()).expect("build");
        for item in items {
            pipeline.input((*item).to_string()).expect("input");
        }
        pipeline.eof().expect("eof");
        pipeline
            .outputs()
            .collect::<Result<Vec<_>, _>>()
            .expect("outputs")
    }

    #[test]
    fn parses_toml_stage_list() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [[stages]]
            kind = "strip-control"

            [[stages]]
            kind = "expand-tabs"
            spaces = 8

            [[stages]]
            kind = "uppercase"
            "#,
        )
        .expect("parse");

        assert_eq!(
            config.stages,
            vec![
                StageSpec::StripControl,
                StageSpec::ExpandTabs { spaces: 8 },
                StageSpec::Uppercase,
            ]
        );
        assert_eq!(run(&config, &["Hello\x01\tworld\x03"]), vec!["HELLO        WORLD"]);
    }

    #[test]
    fn toml_defaults_apply() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [[stages]]
            kind = "expand-tabs"

            [[stages]]
            kind = "print"
            "#,
        )
        .expect("parse");

        assert_eq!(
            config.stages,
            vec![
                StageSpec::ExpandTabs {
                    spaces: DEFAULT_SPACES_PER_TAB
                },
                StageSpec::Print {
                    prefix: DEFAULT_PRINT_PREFIX.to_string()
                },
            ]
        );
    }

    #[test]
    fn compact_matches_toml() {
        let compact =
            PipelineConfig::from_compact(["strip-control", "expand-tabs:8", "uppercase"])
                .expect("compact");
        let toml = PipelineConfig::from_toml_str(
            r#"stages = [
                { kind = "strip-control" },
                { kind = "expand-tabs", spaces = 8 },
                { kind = "uppercase" },
            ]"#,
        )
        .expect("toml");
        assert_eq!(compact, toml);
    }

    #[test]
    fn nested_pipeline_builds() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [[stages]]
            kind = "strip-control"

            [[stages]]
            kind = "pipeline"
            stages = [{ kind = "uppercase" }]
            "#,
        )
        .expect("parse");

        let pipeline = config.build(&quiet()).expect("build");
        assert_eq!(
            pipeline.stage_kinds(),
            vec!["strip-control", "pipeline", "buffer"]
        );
        assert_eq!(run(&config, &["a\x02b"]), vec!["AB"]);
    }

    #[test]
    fn rejects_bad_tab_width() {
        let result = PipelineConfig::from_compact(["expand-tabs:0"]);
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));

        let result = PipelineConfig::from_toml_str(
            r#"stages = [{ kind = "expand-tabs", spaces = 1000 }]"#,
        );
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));

        let result = "expand-tabs:wide".parse::<StageSpec>();
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_unknown_kind_and_stray_argument() {
        assert!(matches!(
            "reverse".parse::<StageSpec>(),
            Err(PipelineError::InvalidConfig(_))
        ));
        assert!(matches!(
            "uppercase:yes".parse::<StageSpec>(),
            Err(PipelineError::InvalidConfig(_))
        ));
        assert!(matches!(
            "pipeline".parse::<StageSpec>(),
            Err(PipelineError::InvalidConfig(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str(r#"stages = [{ kind = "reverse" }]"#),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_unknown_stage_fields() {
        for source in [
            r#"stages = [{ kind = "expand-tabs", space = 8 }]"#,
            r#"stages = [{ kind = "uppercase", prefix = "x" }]"#,
            r#"stages = [{ kind = "print", prefx = ">> " }]"#,
            r#"stages = [{ kind = "pipeline", stages = [{ kind = "discard", spaces = 2 }] }]"#,
        ] {
            assert!(
                matches!(
                    PipelineConfig::from_toml_str(source),
                    Err(PipelineError::InvalidConfig(_))
                ),
                "accepted: {source}"
            );
        }
    }

    #[test]
    fn rejects_excessive_nesting() {
        let mut spec = StageSpec::Uppercase;
        for _ in 0..=MAX_NESTING_DEPTH {
            spec = StageSpec::Pipeline { stages: vec![spec] };
        }
        let config = PipelineConfig::new(vec![spec]);
        assert!(matches!(
            config.build(&quiet()),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn print_stages_report_to_observer() {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&lines);
        let observer: Observer = Rc::new(move |line: &str| seen.borrow_mut().push(line.to_string()));

        let config = PipelineConfig::from_compact(["print", "sink-print:done "]).expect("compact");
        let mut pipeline = config.build(&observer).expect("build");
        pipeline.input("a\tb".to_string()).expect("input");

        assert_eq!(
            *lines.borrow(),
            vec!["print: \"a\tb\"".to_string(), "done \"a\tb\"".to_string()]
        );
        assert!(!pipeline.state().expect("state").has_output());
    }

    #[test]
    fn only_discard_skips_trailing_buffer() {
        let config = PipelineConfig::from_compact(["uppercase", "sink-print"]).expect("compact");
        let mut pipeline = config.build(&quiet()).expect("build");
        assert_eq!(pipeline.stage_kinds(), vec!["uppercase", "sink", "buffer"]);

        pipeline.input("x".to_string()).expect("input");
        assert_eq!(pipeline.state().expect("state"), StageState::CanInput);

        let config = PipelineConfig::from_compact(["uppercase", "discard"]).expect("compact");
        let pipeline = config.build(&quiet()).expect("build");
        assert_eq!(pipeline.stage_kinds(), vec!["uppercase", "sink"]);
    }

    #[test]
    fn split_lines_then_discard_swallows_everything() {
        let config = PipelineConfig::from_compact(["split-lines", "discard"]).expect("compact");
        assert!(run(&config, &["a\nb\nc"]).is_empty());
    }
}
