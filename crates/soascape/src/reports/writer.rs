//! Hierarchical XML serialization of one report.
//!
//! Every document has a single root element named by
//! [`crate::naming::element_name`], carries the `urn:soascape` namespace,
//! omits the XML declaration, and is indented. Catalog-only reports loop
//! over the two unit collections; deployment reports wrap that loop in an
//! outer loop over service domains. A unit filter applies at the outermost
//! unit level only; domain and root elements are still emitted when they
//! end up empty for that unit.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::catalog::{CatalogSnapshot, UnitId};
use crate::error::SoascapeError;
use crate::naming::element_name;
use crate::reports::{NAMESPACE_URN, ReportDescriptor, ReportKind};
use crate::resolver::EndpointResolutionCache;

pub struct XmlReportWriter<'a> {
    catalog: &'a CatalogSnapshot,
    resolutions: &'a EndpointResolutionCache,
}

impl<'a> XmlReportWriter<'a> {
    pub fn new(catalog: &'a CatalogSnapshot, resolutions: &'a EndpointResolutionCache) -> Self {
        Self {
            catalog,
            resolutions,
        }
    }

    /// Serializes one report into `out`. An error abandons the document
    /// mid-stream; the caller decides what to do with the partial file.
    pub fn write_document<W: Write>(
        &self,
        descriptor: &ReportDescriptor,
        out: W,
        unit_filter: Option<UnitId>,
    ) -> Result<(), SoascapeError> {
        let mut wr = Writer::new_with_indent(out, b' ', 2);

        let root = element_name(descriptor.identifier);
        let mut open = BytesStart::new(root.as_str());
        open.push_attribute(("xmlns", NAMESPACE_URN));
        wr.write_event(Event::Start(open))?;

        match descriptor.kind {
            ReportKind::Applications => self.write_applications(&mut wr)?,
            ReportKind::ApplicationVersions => self.write_application_versions(&mut wr)?,
            ReportKind::DeployedApplications => self.write_deployed_applications(&mut wr)?,
            ReportKind::Services => self.write_services(&mut wr)?,
            ReportKind::ServiceVersions => self.write_service_versions(&mut wr)?,
            ReportKind::DeployedServices => self.write_deployed_services(&mut wr)?,
            ReportKind::MediatedEndpoints => self.write_mediated_endpoints(&mut wr, unit_filter)?,
            ReportKind::ConsumedPerService => {
                self.write_consumed_per_service(&mut wr, unit_filter)?
            }
            ReportKind::ConsumedPerApplication => {
                self.write_consumed_per_application(&mut wr, unit_filter)?
            }
        }

        wr.write_event(Event::End(BytesEnd::new(root.as_str())))?;
        Ok(())
    }

    /// The two unit collections with their container element names.
    fn unit_groups(&self) -> [(&'static str, Vec<UnitId>); 2] {
        [
            ("BusinessUnit", self.catalog.internal_units()),
            ("ExternalOrganization", self.catalog.external_units()),
        ]
    }

    fn write_applications<W: Write>(&self, wr: &mut Writer<W>) -> Result<(), SoascapeError> {
        for (node_name, units) in self.unit_groups() {
            for unit_id in units {
                start_named(wr, node_name, self.catalog.unit_label(unit_id)?)?;
                start(wr, "Applications")?;
                for (_, app) in self.catalog.definitions_of(unit_id) {
                    start(wr, "Application")?;
                    leaf(wr, "name", &app.name)?;
                    leaf(wr, "description", &app.description)?;
                    end(wr, "Application")?;
                }
                end(wr, "Applications")?;
                end(wr, node_name)?;
            }
        }
        Ok(())
    }

    fn write_application_versions<W: Write>(
        &self,
        wr: &mut Writer<W>,
    ) -> Result<(), SoascapeError> {
        for (node_name, units) in self.unit_groups() {
            for unit_id in units {
                start_named(wr, node_name, self.catalog.unit_label(unit_id)?)?;
                start(wr, "Applications")?;
                for (definition_id, definition) in self.catalog.definitions_of(unit_id) {
                    for (_, version) in self.catalog.versions_of(definition_id) {
                        start(wr, "Application")?;
                        leaf(wr, "name", &definition.name)?;
                        leaf(wr, "version", &version.version)?;
                        leaf(wr, "description", &definition.description)?;
                        leaf(wr, "versionDescription", &version.description)?;
                        end(wr, "Application")?;
                    }
                }
                end(wr, "Applications")?;
                end(wr, node_name)?;
            }
        }
        Ok(())
    }

    fn write_deployed_applications<W: Write>(
        &self,
        wr: &mut Writer<W>,
    ) -> Result<(), SoascapeError> {
        for (domain_id, domain) in self.catalog.domains() {
            start_named(wr, "ServiceDomain", &domain.name)?;
            for (node_name, units) in self.unit_groups() {
                for unit_id in units {
                    start_named(wr, node_name, self.catalog.unit_label(unit_id)?)?;
                    start(wr, "Applications")?;
                    for (_, deployment) in self.catalog.deployed_in_domain(unit_id, domain_id) {
                        let version = self.catalog.application_origin(deployment)?;
                        let definition = self.catalog.application_origin(version)?;
                        start(wr, "Application")?;
                        leaf(wr, "name", deployment.report_label())?;
                        leaf(wr, "version", &deployment.version)?;
                        leaf(wr, "description", &definition.description)?;
                        leaf(wr, "versionDescription", &version.description)?;
                        leaf(wr, "deploymentDescription", &deployment.description)?;
                        end(wr, "Application")?;
                    }
                    end(wr, "Applications")?;
                    end(wr, node_name)?;
                }
            }
            end(wr, "ServiceDomain")?;
        }
        Ok(())
    }

    fn write_services<W: Write>(&self, wr: &mut Writer<W>) -> Result<(), SoascapeError> {
        for (node_name, units) in self.unit_groups() {
            for unit_id in units {
                start_named(wr, node_name, self.catalog.unit_label(unit_id)?)?;
                start(wr, "Services")?;
                for (definition_id, definition) in self.catalog.definitions_of(unit_id) {
                    for (_, svc) in self.catalog.services_of(definition_id) {
                        start(wr, "Service")?;
                        leaf(wr, "name", &svc.name)?;
                        leaf(wr, "description", &svc.description)?;
                        leaf(wr, "providingApplication", &definition.name)?;
                        end(wr, "Service")?;
                    }
                }
                end(wr, "Services")?;
                end(wr, node_name)?;
            }
        }
        Ok(())
    }

    fn write_service_versions<W: Write>(&self, wr: &mut Writer<W>) -> Result<(), SoascapeError> {
        for (node_name, units) in self.unit_groups() {
            for unit_id in units {
                start_named(wr, node_name, self.catalog.unit_label(unit_id)?)?;
                start(wr, "Services")?;
                for (definition_id, _) in self.catalog.definitions_of(unit_id) {
                    for (version_id, version) in self.catalog.versions_of(definition_id) {
                        for (_, svc) in self.catalog.services_of(version_id) {
                            start(wr, "Service")?;
                            leaf(wr, "name", &svc.name)?;
                            leaf(wr, "version", &svc.version)?;
                            leaf(wr, "description", &svc.description)?;
                            leaf(wr, "providingApplication", &version.name)?;
                            leaf(wr, "applicationVersion", &version.version)?;
                            end(wr, "Service")?;
                        }
                    }
                }
                end(wr, "Services")?;
                end(wr, node_name)?;
            }
        }
        Ok(())
    }

    fn write_deployed_services<W: Write>(&self, wr: &mut Writer<W>) -> Result<(), SoascapeError> {
        for (domain_id, domain) in self.catalog.domains() {
            start_named(wr, "ServiceDomain", &domain.name)?;
            for (node_name, units) in self.unit_groups() {
                for unit_id in units {
                    start_named(wr, node_name, self.catalog.unit_label(unit_id)?)?;
                    start(wr, "Services")?;
                    for (deployment_id, deployment) in
                        self.catalog.deployed_in_domain(unit_id, domain_id)
                    {
                        for (_, svc) in self.catalog.services_of(deployment_id) {
                            let version = self.catalog.service_origin(svc)?;
                            let definition = self.catalog.service_origin(version)?;
                            start(wr, "Service")?;
                            leaf(wr, "providingApplication", deployment.report_label())?;
                            leaf(wr, "applicationVersion", &deployment.version)?;
                            leaf(wr, "name", &svc.name)?;
                            leaf(wr, "version", &svc.version)?;
                            leaf(wr, "description", &definition.description)?;
                            leaf(wr, "versionDescription", &version.description)?;
                            leaf(wr, "deploymentDescription", &svc.description)?;
                            leaf(wr, "targetNamespace", &svc.target_namespace)?;
                            leaf(wr, "definitionName", &svc.definition_name)?;
                            end(wr, "Service")?;
                        }
                    }
                    end(wr, "Services")?;
                    end(wr, node_name)?;
                }
            }
            end(wr, "ServiceDomain")?;
        }
        Ok(())
    }

    fn write_mediated_endpoints<W: Write>(
        &self,
        wr: &mut Writer<W>,
        unit_filter: Option<UnitId>,
    ) -> Result<(), SoascapeError> {
        for (domain_id, domain) in self.catalog.domains() {
            start_named(wr, "ServiceDomain", &domain.name)?;
            for (node_name, units) in self.unit_groups() {
                for unit_id in units {
                    if unit_filter.is_some_and(|only| only != unit_id) {
                        continue;
                    }
                    start_named(wr, node_name, self.catalog.unit_label(unit_id)?)?;
                    start(wr, "Services")?;
                    for (deployment_id, deployment) in
                        self.catalog.deployed_in_domain(unit_id, domain_id)
                    {
                        for (service_id, svc) in self.catalog.services_of(deployment_id) {
                            let mut open = BytesStart::new("Service");
                            open.push_attribute(("name", svc.name.as_str()));
                            open.push_attribute(("application", deployment.report_label()));
                            wr.write_event(Event::Start(open))?;
                            start(wr, "Endpoints")?;
                            for (endpoint_id, ep) in self.catalog.endpoints_of(service_id) {
                                let gateway = self.catalog.gateway(ep.gateway)?;
                                start_named(wr, "Endpoint", &ep.name)?;
                                leaf(wr, "gateway", &gateway.name)?;
                                leaf(wr, "resolutionPath", &ep.resolution_path)?;
                                leaf(
                                    wr,
                                    "protectedEndpoint",
                                    self.resolutions.protected_url(endpoint_id),
                                )?;
                                leaf(wr, "applicationVersion", &deployment.version)?;
                                leaf(wr, "serviceVersion", &svc.version)?;
                                leaf(wr, "description", &ep.description)?;
                                end(wr, "Endpoint")?;
                            }
                            end(wr, "Endpoints")?;
                            end(wr, "Service")?;
                        }
                    }
                    end(wr, "Services")?;
                    end(wr, node_name)?;
                }
            }
            end(wr, "ServiceDomain")?;
        }
        Ok(())
    }

    fn write_consumed_per_service<W: Write>(
        &self,
        wr: &mut Writer<W>,
        unit_filter: Option<UnitId>,
    ) -> Result<(), SoascapeError> {
        for (domain_id, domain) in self.catalog.domains() {
            start_named(wr, "ServiceDomain", &domain.name)?;
            for (node_name, units) in self.unit_groups() {
                for unit_id in units {
                    if unit_filter.is_some_and(|only| only != unit_id) {
                        continue;
                    }
                    start_named(wr, node_name, self.catalog.unit_label(unit_id)?)?;
                    start(wr, "Services")?;
                    for (deployment_id, deployment) in
                        self.catalog.deployed_in_domain(unit_id, domain_id)
                    {
                        for (service_id, svc) in self.catalog.services_of(deployment_id) {
                            let mut open = BytesStart::new("Service");
                            open.push_attribute(("name", svc.name.as_str()));
                            open.push_attribute(("application", deployment.report_label()));
                            wr.write_event(Event::Start(open))?;
                            start(wr, "Applications")?;
                            for (_, ep) in self.catalog.endpoints_of(service_id) {
                                let gateway = self.catalog.gateway(ep.gateway)?;
                                for consumer_id in &ep.consumers {
                                    let consumer = self.catalog.application(*consumer_id)?;
                                    start(wr, "Application")?;
                                    leaf(wr, "name", consumer.report_label())?;
                                    leaf(wr, "version", &consumer.version)?;
                                    leaf(wr, "endpointName", &ep.name)?;
                                    leaf(wr, "gateway", &gateway.name)?;
                                    leaf(wr, "resolutionPath", &ep.resolution_path)?;
                                    leaf(wr, "targetNamespace", &svc.target_namespace)?;
                                    end(wr, "Application")?;
                                }
                            }
                            end(wr, "Applications")?;
                            end(wr, "Service")?;
                        }
                    }
                    end(wr, "Services")?;
                    end(wr, node_name)?;
                }
            }
            end(wr, "ServiceDomain")?;
        }
        Ok(())
    }

    fn write_consumed_per_application<W: Write>(
        &self,
        wr: &mut Writer<W>,
        unit_filter: Option<UnitId>,
    ) -> Result<(), SoascapeError> {
        for (domain_id, domain) in self.catalog.domains() {
            start_named(wr, "ServiceDomain", &domain.name)?;
            for (node_name, units) in self.unit_groups() {
                for unit_id in units {
                    if unit_filter.is_some_and(|only| only != unit_id) {
                        continue;
                    }
                    start_named(wr, node_name, self.catalog.unit_label(unit_id)?)?;
                    start(wr, "Applications")?;
                    for (deployment_id, deployment) in
                        self.catalog.deployed_in_domain(unit_id, domain_id)
                    {
                        start_named(wr, "Application", deployment.report_label())?;
                        start(wr, "Services")?;
                        for (_, ep) in self.catalog.consumed_endpoints_of(deployment_id) {
                            let parent = self.catalog.service(ep.service)?;
                            let provider = self.catalog.application(parent.application)?;
                            let provider_unit = self.catalog.unit(provider.unit)?;
                            let gateway = self.catalog.gateway(ep.gateway)?;
                            start(wr, "Service")?;
                            leaf(wr, "consumingApplicationVersion", &deployment.version)?;
                            leaf(wr, "name", &parent.name)?;
                            leaf(wr, "version", &parent.version)?;
                            leaf(wr, "targetNamespace", &parent.target_namespace)?;
                            leaf(wr, "endpointName", &ep.name)?;
                            leaf(wr, "gateway", &gateway.name)?;
                            leaf(wr, "resolutionPath", &ep.resolution_path)?;
                            leaf(wr, "application", provider.report_label())?;
                            leaf(wr, "applicationVersion", &provider.version)?;
                            leaf(wr, "businessUnit", &provider_unit.name)?;
                            leaf(wr, "organization", &provider_unit.organization)?;
                            end(wr, "Service")?;
                        }
                        end(wr, "Services")?;
                        end(wr, "Application")?;
                    }
                    end(wr, "Applications")?;
                    end(wr, node_name)?;
                }
            }
            end(wr, "ServiceDomain")?;
        }
        Ok(())
    }
}

fn start<W: Write>(wr: &mut Writer<W>, tag: &str) -> Result<(), SoascapeError> {
    wr.write_event(Event::Start(BytesStart::new(tag)))?;
    Ok(())
}

fn start_named<W: Write>(wr: &mut Writer<W>, tag: &str, name: &str) -> Result<(), SoascapeError> {
    let mut open = BytesStart::new(tag);
    open.push_attribute(("name", name));
    wr.write_event(Event::Start(open))?;
    Ok(())
}

fn end<W: Write>(wr: &mut Writer<W>, tag: &str) -> Result<(), SoascapeError> {
    wr.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn leaf<W: Write>(wr: &mut Writer<W>, tag: &str, text: &str) -> Result<(), SoascapeError> {
    wr.write_event(Event::Start(BytesStart::new(tag)))?;
    wr.write_event(Event::Text(BytesText::new(text)))?;
    wr.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        Application, ApplicationId, BusinessUnit, CatalogSnapshot, DomainId, Endpoint, EndpointId,
        Gateway, GatewayId, Service, ServiceDomain, ServiceId, UnitKind,
    };
    use quick_xml::Reader;
    use quick_xml::events::Event as ReadEvent;

    fn application(
        name: &str,
        display: &str,
        version: &str,
        description: &str,
        unit: UnitId,
        origin: Option<ApplicationId>,
        domain: Option<DomainId>,
    ) -> Application {
        Application {
            name: name.into(),
            display_name: display.into(),
            version: version.into(),
            description: description.into(),
            unit,
            origin,
            domain,
        }
    }

    fn fixture() -> CatalogSnapshot {
        CatalogSnapshot {
            domains: vec![ServiceDomain {
                name: "Payments".into(),
            }],
            units: vec![
                BusinessUnit {
                    name: "Treasury".into(),
                    kind: UnitKind::Internal,
                    organization: "Acme".into(),
                },
                BusinessUnit {
                    name: "Lending".into(),
                    kind: UnitKind::Internal,
                    organization: "Acme".into(),
                },
                BusinessUnit {
                    name: "PartnerX-Unit".into(),
                    kind: UnitKind::External,
                    organization: "PartnerX".into(),
                },
            ],
            applications: vec![
                // Treasury: Ledger definition -> version -> deployment.
                application("Ledger", "", "", "Ledger system", UnitId(0), None, None),
                application(
                    "Ledger",
                    "",
                    "1.2",
                    "Adds netting",
                    UnitId(0),
                    Some(ApplicationId(0)),
                    None,
                ),
                application(
                    "Ledger",
                    "Ledger (prod)",
                    "1.2",
                    "Production rollout",
                    UnitId(0),
                    Some(ApplicationId(1)),
                    Some(DomainId(0)),
                ),
                // Lending: Loans definition -> version -> deployment.
                application("Loans", "", "", "Loan origination", UnitId(1), None, None),
                application(
                    "Loans",
                    "",
                    "2.0",
                    "Scoring rework",
                    UnitId(1),
                    Some(ApplicationId(3)),
                    None,
                ),
                application(
                    "Loans",
                    "Loans (prod)",
                    "2.0",
                    "Production rollout",
                    UnitId(1),
                    Some(ApplicationId(4)),
                    Some(DomainId(0)),
                ),
            ],
            services: vec![
                Service {
                    name: "Booking".into(),
                    version: String::new(),
                    description: "Books postings".into(),
                    target_namespace: String::new(),
                    definition_name: String::new(),
                    application: ApplicationId(0),
                    origin: None,
                },
                Service {
                    name: "Booking".into(),
                    version: "1.2".into(),
                    description: "Faster postings".into(),
                    target_namespace: String::new(),
                    definition_name: String::new(),
                    application: ApplicationId(1),
                    origin: Some(ServiceId(0)),
                },
                Service {
                    name: "Booking".into(),
                    version: "1.2".into(),
                    description: "Prod tuning".into(),
                    target_namespace: "urn:acme:booking".into(),
                    definition_name: "Booking.wsdl".into(),
                    application: ApplicationId(2),
                    origin: Some(ServiceId(1)),
                },
            ],
            endpoints: vec![Endpoint {
                name: "BookingEP".into(),
                description: "Primary endpoint".into(),
                service: ServiceId(2),
                gateway: GatewayId(0),
                resolution_path: "/booking".into(),
                registry_folder_url: "https://registry/acme/booking/".into(),
                consumers: vec![ApplicationId(5)],
            }],
            gateways: vec![Gateway {
                name: "gw-east".into(),
            }],
        }
    }

    fn render(
        catalog: &CatalogSnapshot,
        descriptor: &ReportDescriptor,
        unit_filter: Option<UnitId>,
        resolutions: &EndpointResolutionCache,
    ) -> String {
        let writer = XmlReportWriter::new(catalog, resolutions);
        let mut out = Vec::new();
        writer
            .write_document(descriptor, &mut out, unit_filter)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn descriptor(kind: ReportKind) -> ReportDescriptor {
        ReportDescriptor::all()
            .find(|d| d.kind == kind)
            .expect("registered report kind")
    }

    /// Element paths (slash-joined ancestor chains) of every element in the
    /// document, in document order.
    fn element_paths(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut stack: Vec<String> = Vec::new();
        let mut paths = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                ReadEvent::Start(start) => {
                    let name = String::from_utf8(start.local_name().as_ref().to_vec()).unwrap();
                    stack.push(name);
                    paths.push(stack.join("/"));
                }
                ReadEvent::End(_) => {
                    stack.pop();
                }
                ReadEvent::Eof => break,
                _ => {}
            }
        }
        paths
    }

    #[test]
    fn mediated_endpoints_round_trip_hierarchy() {
        let catalog = fixture();
        let mut cache = EndpointResolutionCache::new();
        cache.record(EndpointId(0), "https://gw.example/booking".into());

        let xml = render(
            &catalog,
            &descriptor(ReportKind::MediatedEndpoints),
            None,
            &cache,
        );

        assert!(xml.starts_with(&format!("<Endpoints xmlns=\"{NAMESPACE_URN}\"")));
        assert!(xml.contains("<protectedEndpoint>https://gw.example/booking</protectedEndpoint>"));

        let paths = element_paths(&xml);
        let expected_chain = [
            "Endpoints",
            "Endpoints/ServiceDomain",
            "Endpoints/ServiceDomain/BusinessUnit",
            "Endpoints/ServiceDomain/BusinessUnit/Services",
            "Endpoints/ServiceDomain/BusinessUnit/Services/Service",
            "Endpoints/ServiceDomain/BusinessUnit/Services/Service/Endpoints",
            "Endpoints/ServiceDomain/BusinessUnit/Services/Service/Endpoints/Endpoint",
        ];
        for expected in expected_chain {
            assert!(
                paths.iter().any(|p| p == expected),
                "missing {expected} in {paths:?}"
            );
        }
        // Exactly one endpoint element, no duplicates.
        assert_eq!(
            paths
                .iter()
                .filter(|p| p.ends_with("/Endpoints/Endpoint"))
                .count(),
            1
        );
        // One domain element, one root.
        assert_eq!(paths.iter().filter(|p| *p == "Endpoints").count(), 1);
        assert_eq!(
            paths
                .iter()
                .filter(|p| *p == "Endpoints/ServiceDomain")
                .count(),
            1
        );
    }

    #[test]
    fn unresolved_endpoint_serializes_empty_protected_url() {
        let catalog = fixture();
        let cache = EndpointResolutionCache::new();
        let xml = render(
            &catalog,
            &descriptor(ReportKind::MediatedEndpoints),
            None,
            &cache,
        );
        assert!(xml.contains("<protectedEndpoint></protectedEndpoint>"));
    }

    #[test]
    fn unit_filter_emits_only_that_units_subtree() {
        let catalog = fixture();
        let cache = EndpointResolutionCache::new();

        let xml = render(
            &catalog,
            &descriptor(ReportKind::ConsumedPerService),
            Some(UnitId(0)),
            &cache,
        );
        assert!(xml.contains("BusinessUnit name=\"Treasury\""));
        assert!(!xml.contains("Lending"));
        assert!(!xml.contains("PartnerX"));
        // Domain and root are still present even though other units were
        // skipped.
        assert!(xml.contains("ServiceDomain name=\"Payments\""));
    }

    #[test]
    fn unit_filter_with_no_matches_still_emits_domain_and_root() {
        let catalog = fixture();
        let cache = EndpointResolutionCache::new();

        // The external unit has no deployments: everything under it is empty.
        let xml = render(
            &catalog,
            &descriptor(ReportKind::MediatedEndpoints),
            Some(UnitId(2)),
            &cache,
        );
        let paths = element_paths(&xml);
        assert!(paths.contains(&"Endpoints".to_string()));
        assert!(paths.contains(&"Endpoints/ServiceDomain".to_string()));
        assert!(!xml.contains("Treasury"));
    }

    #[test]
    fn applications_report_lists_definitions_per_unit() {
        let catalog = fixture();
        let cache = EndpointResolutionCache::new();
        let xml = render(&catalog, &descriptor(ReportKind::Applications), None, &cache);

        assert!(xml.starts_with(&format!("<Applications xmlns=\"{NAMESPACE_URN}\"")));
        assert!(xml.contains("BusinessUnit name=\"Treasury\""));
        assert!(xml.contains("BusinessUnit name=\"Lending\""));
        // External units are labeled by organization.
        assert!(xml.contains("ExternalOrganization name=\"PartnerX\""));
        assert!(xml.contains("<name>Ledger</name>"));
        assert!(xml.contains("<name>Loans</name>"));
        // Only definitions appear: the versioned/deployment tiers do not.
        assert!(!xml.contains("Ledger (prod)"));
    }

    #[test]
    fn service_versions_report_follows_version_chain() {
        let catalog = fixture();
        let cache = EndpointResolutionCache::new();
        let xml = render(
            &catalog,
            &descriptor(ReportKind::ServiceVersions),
            None,
            &cache,
        );
        assert!(xml.starts_with(&format!("<Services xmlns=\"{NAMESPACE_URN}\"")));
        assert!(xml.contains("<name>Booking</name>"));
        assert!(xml.contains("<version>1.2</version>"));
        assert!(xml.contains("<applicationVersion>1.2</applicationVersion>"));
        assert!(xml.contains("<description>Faster postings</description>"));
    }

    #[test]
    fn deployed_services_report_unwinds_origin_chain() {
        let catalog = fixture();
        let cache = EndpointResolutionCache::new();
        let xml = render(
            &catalog,
            &descriptor(ReportKind::DeployedServices),
            None,
            &cache,
        );
        assert!(xml.contains("<providingApplication>Ledger (prod)</providingApplication>"));
        assert!(xml.contains("<description>Books postings</description>"));
        assert!(xml.contains("<versionDescription>Faster postings</versionDescription>"));
        assert!(xml.contains("<deploymentDescription>Prod tuning</deploymentDescription>"));
        assert!(xml.contains("<targetNamespace>urn:acme:booking</targetNamespace>"));
        assert!(xml.contains("<definitionName>Booking.wsdl</definitionName>"));
    }

    #[test]
    fn consumed_per_application_reports_provider_side() {
        let catalog = fixture();
        let cache = EndpointResolutionCache::new();
        let xml = render(
            &catalog,
            &descriptor(ReportKind::ConsumedPerApplication),
            None,
            &cache,
        );
        // The Loans deployment consumes the Booking endpoint provided by the
        // Ledger deployment out of Treasury.
        assert!(xml.contains("Application name=\"Loans (prod)\""));
        assert!(xml.contains("<application>Ledger (prod)</application>"));
        assert!(xml.contains("<businessUnit>Treasury</businessUnit>"));
        assert!(xml.contains("<organization>Acme</organization>"));
        assert!(xml.contains("<endpointName>BookingEP</endpointName>"));
    }

    #[test]
    fn broken_origin_chain_is_an_error_not_a_panic() {
        let mut catalog = fixture();
        // Deployment whose origin link is gone: the deployed-applications
        // traversal must fail cleanly.
        catalog.applications[2].origin = None;
        let cache = EndpointResolutionCache::new();
        let writer = XmlReportWriter::new(&catalog, &cache);
        let mut out = Vec::new();
        let err = writer
            .write_document(
                &descriptor(ReportKind::DeployedApplications),
                &mut out,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, SoascapeError::Catalog(_)));
    }
}
