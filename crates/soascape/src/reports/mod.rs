//! Report registry: the fixed set of report types a run produces.

pub mod writer;

pub use writer::XmlReportWriter;

/// XML namespace declared on every report root element.
pub const NAMESPACE_URN: &str = "urn:soascape";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    Applications,
    ApplicationVersions,
    DeployedApplications,
    Services,
    ServiceVersions,
    DeployedServices,
    MediatedEndpoints,
    ConsumedPerService,
    ConsumedPerApplication,
}

/// Flavor hint forwarded to the style-sheet transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformKind {
    Outline,
    Deployment,
    Realization,
}

impl TransformKind {
    /// Value of the `type` transform parameter; outline reports send none.
    pub fn parameter(self) -> Option<&'static str> {
        match self {
            TransformKind::Outline => None,
            TransformKind::Deployment => Some("deployed"),
            TransformKind::Realization => Some("version"),
        }
    }
}

/// Static description of one report type. Identifiers are unique within a
/// run; the identifier drives both the XML root element name and the HTML
/// output file name.
#[derive(Clone, Copy, Debug)]
pub struct ReportDescriptor {
    pub kind: ReportKind,
    pub identifier: &'static str,
    pub stylesheet: Option<&'static str>,
    pub transform: TransformKind,
}

impl ReportDescriptor {
    const fn new(
        kind: ReportKind,
        identifier: &'static str,
        stylesheet: Option<&'static str>,
        transform: TransformKind,
    ) -> Self {
        Self {
            kind,
            identifier,
            stylesheet,
            transform,
        }
    }

    /// Reports of the public scope, in generation order.
    pub const PUBLIC: [ReportDescriptor; 6] = [
        ReportDescriptor::new(
            ReportKind::Applications,
            "Applications",
            Some("applications.xsl"),
            TransformKind::Outline,
        ),
        ReportDescriptor::new(
            ReportKind::ApplicationVersions,
            "Applications-Versions",
            Some("applications.xsl"),
            TransformKind::Realization,
        ),
        ReportDescriptor::new(
            ReportKind::DeployedApplications,
            "Applications-Deployed",
            Some("applications.xsl"),
            TransformKind::Deployment,
        ),
        ReportDescriptor::new(
            ReportKind::Services,
            "Services",
            Some("services.xsl"),
            TransformKind::Outline,
        ),
        ReportDescriptor::new(
            ReportKind::ServiceVersions,
            "Services-Versions",
            Some("services.xsl"),
            TransformKind::Realization,
        ),
        ReportDescriptor::new(
            ReportKind::DeployedServices,
            "Services-Deployed",
            Some("services.xsl"),
            TransformKind::Deployment,
        ),
    ];

    /// Reports generated for the special scope and, unit-filtered, for each
    /// private scope.
    pub const SCOPED: [ReportDescriptor; 3] = [
        ReportDescriptor::new(
            ReportKind::MediatedEndpoints,
            "Endpoints-Mediated",
            Some("endpoints.xsl"),
            TransformKind::Outline,
        ),
        ReportDescriptor::new(
            ReportKind::ConsumedPerService,
            "Services-ConsumedPerService",
            Some("consumed-per-service.xsl"),
            TransformKind::Outline,
        ),
        ReportDescriptor::new(
            ReportKind::ConsumedPerApplication,
            "Services-ConsumedPerApplication",
            Some("consumed-per-application.xsl"),
            TransformKind::Outline,
        ),
    ];

    pub fn all() -> impl Iterator<Item = ReportDescriptor> {
        Self::PUBLIC.into_iter().chain(Self::SCOPED)
    }
}
