pub mod catalog;
pub mod error;
pub mod layout;
pub mod naming;
pub mod orchestrator;
pub mod reports;
pub mod resolver;
pub mod runlog;
pub mod transform;

pub use catalog::{
    Application, ApplicationId, BusinessUnit, CatalogSnapshot, DomainId, Endpoint, EndpointId,
    Gateway, GatewayId, Service, ServiceDomain, ServiceId, UnitId, UnitKind,
};
pub use error::SoascapeError;
pub use layout::OutputLayout;
pub use naming::{TranslationTable, element_name, html_file_name};
pub use orchestrator::{ReportOrchestrator, RunConfig, RunSummary};
pub use reports::{
    NAMESPACE_URN, ReportDescriptor, ReportKind, TransformKind, XmlReportWriter,
};
pub use resolver::{
    CredentialConfig, DirectPathMapper, EndpointResolutionCache, EndpointResolver, HttpSettings,
    LocalPathMapper, ResolverSettings, VirtualRootMapper, nth_index_of, remove_host, replace_host,
};
pub use runlog::RunLog;
pub use transform::{
    HandlebarsStylesheetEngine, StylesheetEngine, TOOL_VERSION, TransformParams, TransformRunner,
};
