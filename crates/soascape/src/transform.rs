//! Style-sheet transform of a written XML report into HTML.
//!
//! The transform engine itself is an external collaborator hidden behind
//! [`StylesheetEngine`]: it takes the XML document, a style sheet, and the
//! fixed parameter set, and produces text. The default engine renders the
//! style sheet as a Handlebars template; a real XSLT processor plugs in by
//! implementing the trait.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use handlebars::Handlebars;
use serde_json::Value;

use crate::error::SoascapeError;
use crate::naming::{TranslationTable, html_file_name};
use crate::reports::ReportDescriptor;
use crate::runlog::RunLog;

/// Build label reported to every transform.
pub const TOOL_VERSION: &str = "v 2.0";

const BASEDIR_PRIVATE: &str = "./../../../";
const BASEDIR_SHARED: &str = "./../../";

pub type ParameterMap = BTreeMap<String, Value>;

/// The full parameter contract passed to the style-sheet engine.
#[derive(Clone, Debug)]
pub struct TransformParams {
    pub tool_version: &'static str,
    pub generation_date: String,
    /// `deployed` or `version` for the flavored reports, absent otherwise.
    pub transform_type: Option<&'static str>,
    /// Relative prefix back to the output root; encodes the nesting depth of
    /// the report's directory.
    pub basedir: &'static str,
}

impl TransformParams {
    pub fn to_map(&self) -> ParameterMap {
        let mut map = ParameterMap::new();
        map.insert(
            "toolVersion".into(),
            Value::String(self.tool_version.into()),
        );
        map.insert(
            "generationDate".into(),
            Value::String(self.generation_date.clone()),
        );
        if let Some(kind) = self.transform_type {
            map.insert("type".into(), Value::String(kind.into()));
        }
        map.insert("basedir".into(), Value::String(self.basedir.into()));
        map
    }
}

/// Engine turning one XML report plus a style sheet into HTML text.
pub trait StylesheetEngine: Send + Sync {
    fn transform(
        &self,
        xml_path: &Path,
        stylesheet: &Path,
        params: &TransformParams,
    ) -> Result<String, SoascapeError>;
}

impl<T> StylesheetEngine for Arc<T>
where
    T: StylesheetEngine + ?Sized,
{
    fn transform(
        &self,
        xml_path: &Path,
        stylesheet: &Path,
        params: &TransformParams,
    ) -> Result<String, SoascapeError> {
        (**self).transform(xml_path, stylesheet, params)
    }
}

/// Default engine: the style sheet is a Handlebars template rendered over
/// the transform parameters plus the raw report under the `document` key.
#[derive(Default)]
pub struct HandlebarsStylesheetEngine {
    registry: Handlebars<'static>,
}

impl HandlebarsStylesheetEngine {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }
}

impl StylesheetEngine for HandlebarsStylesheetEngine {
    fn transform(
        &self,
        xml_path: &Path,
        stylesheet: &Path,
        params: &TransformParams,
    ) -> Result<String, SoascapeError> {
        let sheet = fs::read_to_string(stylesheet)?;
        let document = fs::read_to_string(xml_path)?;
        let mut context = params.to_map();
        context.insert("document".into(), Value::String(document));
        self.registry
            .render_template(&sheet, &context)
            .map_err(|err| SoascapeError::Transform(err.to_string()))
    }
}

/// Drives the transform step for written reports.
pub struct TransformRunner<'e, E: StylesheetEngine> {
    engine: &'e E,
    xsl_dir: PathBuf,
    generation_date: String,
}

impl<'e, E: StylesheetEngine> TransformRunner<'e, E> {
    pub fn new(engine: &'e E, xsl_dir: PathBuf, generation_date: String) -> Self {
        Self {
            engine,
            xsl_dir,
            generation_date,
        }
    }

    /// Renders the HTML sibling of one written XML report. A missing style
    /// sheet is a silent skip; any other failure is logged and the run moves
    /// on; a partial or absent HTML file is an accepted outcome.
    pub fn run(
        &self,
        descriptor: &ReportDescriptor,
        xml_dir: &Path,
        xml_path: &Path,
        private_scope: bool,
        translations: &TranslationTable,
        log: &mut RunLog,
    ) {
        let Some(sheet_name) = descriptor.stylesheet else {
            return;
        };
        let sheet_path = self.xsl_dir.join(sheet_name);
        if !sheet_path.exists() {
            return;
        }

        let Some(out_dir) = xml_dir.parent() else {
            log.error(format!(
                "transform of {} failed: {} has no parent directory",
                descriptor.identifier,
                xml_dir.display()
            ));
            return;
        };

        let html_name = html_file_name(descriptor.identifier, translations);
        let params = TransformParams {
            tool_version: TOOL_VERSION,
            generation_date: self.generation_date.clone(),
            transform_type: descriptor.transform.parameter(),
            basedir: if private_scope {
                BASEDIR_PRIVATE
            } else {
                BASEDIR_SHARED
            },
        };

        let outcome = self
            .engine
            .transform(xml_path, &sheet_path, &params)
            .and_then(|html| {
                fs::write(out_dir.join(&html_name), html).map_err(SoascapeError::from)
            });
        if let Err(err) = outcome {
            log.error(format!(
                "transform of {} failed: {err}",
                descriptor.identifier
            ));
        }
    }
}
