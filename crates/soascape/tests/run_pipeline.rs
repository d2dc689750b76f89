use std::fs;
use std::path::Path;

use soascape::{
    Application, ApplicationId, BusinessUnit, CatalogSnapshot, DomainId, Endpoint, Gateway,
    GatewayId, HandlebarsStylesheetEngine, ReportOrchestrator, RunConfig, Service, ServiceDomain,
    ServiceId, SoascapeError, UnitId, UnitKind,
};
use tempfile::TempDir;

fn application(
    name: &str,
    display: &str,
    version: &str,
    unit: UnitId,
    origin: Option<ApplicationId>,
    domain: Option<DomainId>,
) -> Application {
    Application {
        name: name.into(),
        display_name: display.into(),
        version: version.into(),
        description: format!("{name} description"),
        unit,
        origin,
        domain,
    }
}

fn fixture_catalog(registry_folder_url: &str) -> CatalogSnapshot {
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
            application("Ledger", "", "", UnitId(0), None, None),
            application("Ledger", "", "1.2", UnitId(0), Some(ApplicationId(0)), None),
            application(
                "Ledger",
                "Ledger (prod)",
                "1.2",
                UnitId(0),
                Some(ApplicationId(1)),
                Some(DomainId(0)),
            ),
            application("Loans", "", "", UnitId(1), None, None),
            application("Loans", "", "2.0", UnitId(1), Some(ApplicationId(3)), None),
            application(
                "Loans",
                "Loans (prod)",
                "2.0",
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
            registry_folder_url: registry_folder_url.into(),
            consumers: vec![ApplicationId(5)],
        }],
        gateways: vec![Gateway {
            name: "gw-east".into(),
        }],
    }
}

/// Output root with style sheets for every report family, plus a registry
/// mirror holding one endpoint descriptor.
fn prepare_output_root(temp: &TempDir) -> String {
    let xsl = temp.path().join("xsl");
    fs::create_dir_all(&xsl).unwrap();
    for sheet in [
        "applications.xsl",
        "services.xsl",
        "endpoints.xsl",
        "consumed-per-service.xsl",
        "consumed-per-application.xsl",
    ] {
        fs::write(xsl.join(sheet), "{{toolVersion}}").unwrap();
    }

    let registry = temp.path().join("registry").join("booking");
    fs::create_dir_all(&registry).unwrap();
    fs::write(
        registry.join("index.xml"),
        "<endpoint><protectedEndpoint>https://gw.example/booking</protectedEndpoint></endpoint>",
    )
    .unwrap();
    format!("{}/registry/booking/", temp.path().display())
}

fn read_log(root: &Path) -> String {
    let log_dir = root.join("log");
    let entry = fs::read_dir(&log_dir)
        .unwrap()
        .next()
        .expect("log file present")
        .unwrap();
    fs::read_to_string(entry.path()).unwrap()
}

#[test]
fn full_run_writes_every_scope() {
    let temp = TempDir::new().unwrap();
    let registry_url = prepare_output_root(&temp);
    let catalog = fixture_catalog(&registry_url);

    let config = RunConfig::new(temp.path());
    let mut orchestrator = ReportOrchestrator::new(config, HandlebarsStylesheetEngine::new());
    let summary = orchestrator.run(&catalog).unwrap();

    // 6 public + 3 special + 3 per internal unit (two of them).
    assert_eq!(summary.reports_written, 15);
    assert_eq!(summary.failures, 0);
    assert_eq!(summary.resolved_endpoints, 1);
    assert!(summary.log_path.as_deref().is_some_and(Path::exists));

    let public = temp.path().join("reports").join("public");
    for identifier in [
        "Applications",
        "Applications-Versions",
        "Applications-Deployed",
        "Services",
        "Services-Versions",
        "Services-Deployed",
    ] {
        assert!(public.join("xml").join(format!("{identifier}.xml")).is_file());
        assert!(public.join(format!("{identifier}.html")).is_file());
    }

    let special = temp.path().join("reports").join("special");
    for identifier in [
        "Endpoints-Mediated",
        "Services-ConsumedPerService",
        "Services-ConsumedPerApplication",
    ] {
        assert!(
            special
                .join("xml")
                .join(format!("{identifier}.xml"))
                .is_file()
        );
        assert!(special.join(format!("{identifier}.html")).is_file());
    }

    for unit in ["Treasury", "Lending"] {
        let private = temp.path().join("reports").join("private").join(unit);
        assert!(private.join("xml").join("Endpoints-Mediated.xml").is_file());
        assert!(private.join("Endpoints-Mediated.html").is_file());
    }

    // The resolution pass fed the endpoint report.
    let endpoints_xml =
        fs::read_to_string(special.join("xml").join("Endpoints-Mediated.xml")).unwrap();
    assert!(endpoints_xml
        .contains("<protectedEndpoint>https://gw.example/booking</protectedEndpoint>"));

    // The private variant for Lending only carries Lending's subtree.
    let lending_xml = fs::read_to_string(
        temp.path()
            .join("reports")
            .join("private")
            .join("Lending")
            .join("xml")
            .join("Endpoints-Mediated.xml"),
    )
    .unwrap();
    assert!(!lending_xml.contains("Treasury"));

    // Transforms rendered the parameter contract.
    let html = fs::read_to_string(public.join("Applications.html")).unwrap();
    assert_eq!(html, "v 2.0");
}

#[test]
fn failing_report_does_not_abort_the_run() {
    let temp = TempDir::new().unwrap();
    let registry_url = prepare_output_root(&temp);
    let mut catalog = fixture_catalog(&registry_url);
    // Break the Ledger deployment's origin chain: the deployed-applications
    // report fails, everything else still runs.
    catalog.applications[2].origin = None;

    let config = RunConfig::new(temp.path());
    let mut orchestrator = ReportOrchestrator::new(config, HandlebarsStylesheetEngine::new());
    let summary = orchestrator.run(&catalog).unwrap();

    assert_eq!(summary.failures, 1);
    assert_eq!(summary.reports_written, 14);

    let public = temp.path().join("reports").join("public");
    // Later public reports and the following stages were still produced.
    assert!(public.join("xml").join("Services-Deployed.xml").is_file());
    assert!(
        temp.path()
            .join("reports")
            .join("special")
            .join("xml")
            .join("Endpoints-Mediated.xml")
            .is_file()
    );

    let log = read_log(temp.path());
    assert!(log.contains("Applications-Deployed"));
}

#[test]
fn missing_output_root_is_fatal() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nowhere");
    let catalog = fixture_catalog("https://registry.example/booking/");

    let config = RunConfig::new(&missing);
    let mut orchestrator = ReportOrchestrator::new(config, HandlebarsStylesheetEngine::new());
    let err = orchestrator.run(&catalog).unwrap_err();
    assert!(matches!(err, SoascapeError::Setup(_)));
    assert!(orchestrator.last_error().is_some());
    assert!(!missing.exists());
}

#[test]
fn missing_translations_file_is_fatal() {
    let temp = TempDir::new().unwrap();
    let catalog = fixture_catalog("https://registry.example/booking/");

    let mut config = RunConfig::new(temp.path());
    config.translations_file = Some(temp.path().join("translations.xml"));
    let mut orchestrator = ReportOrchestrator::new(config, HandlebarsStylesheetEngine::new());
    let err = orchestrator.run(&catalog).unwrap_err();
    assert!(matches!(err, SoascapeError::Setup(_)));
}

#[test]
fn translations_shape_html_file_names() {
    let temp = TempDir::new().unwrap();
    let registry_url = prepare_output_root(&temp);
    let catalog = fixture_catalog(&registry_url);

    let translations_path = temp.path().join("translations.xml");
    fs::write(
        &translations_path,
        "<Translations><Translation><From>Services-</From><To>SVC_</To></Translation></Translations>",
    )
    .unwrap();

    let mut config = RunConfig::new(temp.path());
    config.translations_file = Some(translations_path);
    let mut orchestrator = ReportOrchestrator::new(config, HandlebarsStylesheetEngine::new());
    orchestrator.run(&catalog).unwrap();

    // "Services-Versions" translates to "SVC_Versions" and keeps only the
    // part before the underscore.
    let public = temp.path().join("reports").join("public");
    assert!(public.join("SVC.html").is_file());
    assert!(!public.join("Services-Versions.html").exists());
}

#[test]
fn skipping_resolution_leaves_protected_urls_empty() {
    let temp = TempDir::new().unwrap();
    let registry_url = prepare_output_root(&temp);
    let catalog = fixture_catalog(&registry_url);

    let mut config = RunConfig::new(temp.path());
    config.resolve_endpoints = false;
    let mut orchestrator = ReportOrchestrator::new(config, HandlebarsStylesheetEngine::new());
    let summary = orchestrator.run(&catalog).unwrap();

    assert_eq!(summary.resolved_endpoints, 0);
    let endpoints_xml = fs::read_to_string(
        temp.path()
            .join("reports")
            .join("special")
            .join("xml")
            .join("Endpoints-Mediated.xml"),
    )
    .unwrap();
    assert!(endpoints_xml.contains("<protectedEndpoint></protectedEndpoint>"));
}

#[test]
fn unresolvable_endpoints_degrade_to_empty_and_log() {
    let temp = TempDir::new().unwrap();
    prepare_output_root(&temp);
    let catalog = fixture_catalog("/definitely/not/mirrored/");

    let config = RunConfig::new(temp.path());
    let mut orchestrator = ReportOrchestrator::new(config, HandlebarsStylesheetEngine::new());
    let summary = orchestrator.run(&catalog).unwrap();

    // The endpoint resolved to empty but every report was still written.
    assert_eq!(summary.reports_written, 15);
    let log = read_log(temp.path());
    assert!(log.contains("index.xml"));
}

#[test]
fn date_suffix_applies_to_scoped_xml_but_not_html() {
    let temp = TempDir::new().unwrap();
    let registry_url = prepare_output_root(&temp);
    let catalog = fixture_catalog(&registry_url);

    let mut config = RunConfig::new(temp.path());
    config.date_suffix = true;
    let mut orchestrator = ReportOrchestrator::new(config, HandlebarsStylesheetEngine::new());
    orchestrator.run(&catalog).unwrap();

    let special_xml = temp.path().join("reports").join("special").join("xml");
    let names: Vec<String> = fs::read_dir(&special_xml)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(
        names
            .iter()
            .any(|name| name.starts_with("Endpoints-Mediated_") && name.ends_with(".xml")),
        "dated file missing from {names:?}"
    );
    // Public reports never take the suffix; HTML names never do.
    assert!(
        temp.path()
            .join("reports")
            .join("public")
            .join("xml")
            .join("Applications.xml")
            .is_file()
    );
    assert!(
        temp.path()
            .join("reports")
            .join("special")
            .join("Endpoints-Mediated.html")
            .is_file()
    );
}
