//! Read-only view of the service catalog.
//!
//! The snapshot is produced by an external catalog component (typically
//! deserialized from a JSON export) and is only ever read for the duration
//! of one reporting run. Applications and services are chained across three
//! tiers through their `origin` links: a deployment points at the version it
//! realizes, and a version points at its definition.

use serde::{Deserialize, Serialize};

use crate::error::SoascapeError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayId(pub usize);

/// A service domain groups deployments; every mediated endpoint is reachable
/// through exactly one domain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceDomain {
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Internal,
    External,
}

/// An organizational unit. Internal business units are reported under their
/// own name, external ones under the name of their owning organization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BusinessUnit {
    pub name: String,
    pub kind: UnitKind,
    #[serde(default)]
    pub organization: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub unit: UnitId,
    /// Version tier points at its definition, deployment tier at its version.
    #[serde(default)]
    pub origin: Option<ApplicationId>,
    /// Set only on the deployment tier.
    #[serde(default)]
    pub domain: Option<DomainId>,
}

impl Application {
    /// Label used in reports; deployments usually carry a richer display name.
    pub fn report_label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_namespace: String,
    #[serde(default)]
    pub definition_name: String,
    /// Owning application entity of the same tier.
    pub application: ApplicationId,
    #[serde(default)]
    pub origin: Option<ServiceId>,
}

/// A mediated endpoint of a deployed service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Endpoint {
    /// Name given by the mediating intermediary.
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub service: ServiceId,
    pub gateway: GatewayId,
    #[serde(default)]
    pub resolution_path: String,
    /// Registry folder holding the endpoint's descriptor document.
    #[serde(default)]
    pub registry_folder_url: String,
    /// Deployment-tier applications consuming this endpoint.
    #[serde(default)]
    pub consumers: Vec<ApplicationId>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Gateway {
    pub name: String,
}

/// Immutable catalog snapshot handed to the reporting run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub domains: Vec<ServiceDomain>,
    #[serde(default)]
    pub units: Vec<BusinessUnit>,
    #[serde(default)]
    pub applications: Vec<Application>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub gateways: Vec<Gateway>,
}

impl CatalogSnapshot {
    pub fn from_json(text: &str) -> Result<Self, SoascapeError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn domains(&self) -> impl Iterator<Item = (DomainId, &ServiceDomain)> {
        self.domains
            .iter()
            .enumerate()
            .map(|(idx, dom)| (DomainId(idx), dom))
    }

    pub fn internal_units(&self) -> Vec<UnitId> {
        self.units_of_kind(UnitKind::Internal)
    }

    pub fn external_units(&self) -> Vec<UnitId> {
        self.units_of_kind(UnitKind::External)
    }

    fn units_of_kind(&self, kind: UnitKind) -> Vec<UnitId> {
        self.units
            .iter()
            .enumerate()
            .filter(|(_, unit)| unit.kind == kind)
            .map(|(idx, _)| UnitId(idx))
            .collect()
    }

    pub fn unit(&self, id: UnitId) -> Result<&BusinessUnit, SoascapeError> {
        self.units
            .get(id.0)
            .ok_or_else(|| SoascapeError::Catalog(format!("unknown business unit id {}", id.0)))
    }

    /// Report label of a unit: its own name for internal units, the owning
    /// organization's name for external ones.
    pub fn unit_label(&self, id: UnitId) -> Result<&str, SoascapeError> {
        let unit = self.unit(id)?;
        Ok(match unit.kind {
            UnitKind::Internal => &unit.name,
            UnitKind::External => &unit.organization,
        })
    }

    pub fn application(&self, id: ApplicationId) -> Result<&Application, SoascapeError> {
        self.applications
            .get(id.0)
            .ok_or_else(|| SoascapeError::Catalog(format!("unknown application id {}", id.0)))
    }

    pub fn service(&self, id: ServiceId) -> Result<&Service, SoascapeError> {
        self.services
            .get(id.0)
            .ok_or_else(|| SoascapeError::Catalog(format!("unknown service id {}", id.0)))
    }

    pub fn endpoint(&self, id: EndpointId) -> Result<&Endpoint, SoascapeError> {
        self.endpoints
            .get(id.0)
            .ok_or_else(|| SoascapeError::Catalog(format!("unknown endpoint id {}", id.0)))
    }

    pub fn gateway(&self, id: GatewayId) -> Result<&Gateway, SoascapeError> {
        self.gateways
            .get(id.0)
            .ok_or_else(|| SoascapeError::Catalog(format!("unknown gateway id {}", id.0)))
    }

    /// One step up the origin chain of an application entity.
    pub fn application_origin(&self, app: &Application) -> Result<&Application, SoascapeError> {
        let id = app.origin.ok_or_else(|| {
            SoascapeError::Catalog(format!("application \"{}\" has no origin", app.name))
        })?;
        self.application(id)
    }

    /// One step up the origin chain of a service entity.
    pub fn service_origin(&self, svc: &Service) -> Result<&Service, SoascapeError> {
        let id = svc.origin.ok_or_else(|| {
            SoascapeError::Catalog(format!("service \"{}\" has no origin", svc.name))
        })?;
        self.service(id)
    }

    /// Definition-tier applications owned by a unit.
    pub fn definitions_of(&self, unit: UnitId) -> impl Iterator<Item = (ApplicationId, &Application)> {
        self.applications
            .iter()
            .enumerate()
            .filter(move |(_, app)| {
                app.unit == unit && app.origin.is_none() && app.domain.is_none()
            })
            .map(|(idx, app)| (ApplicationId(idx), app))
    }

    /// Version-tier applications originated by a definition.
    pub fn versions_of(&self, definition: ApplicationId) -> impl Iterator<Item = (ApplicationId, &Application)> {
        self.applications
            .iter()
            .enumerate()
            .filter(move |(_, app)| app.origin == Some(definition) && app.domain.is_none())
            .map(|(idx, app)| (ApplicationId(idx), app))
    }

    /// Deployment-tier applications of a unit inside one service domain.
    pub fn deployed_in_domain(
        &self,
        unit: UnitId,
        domain: DomainId,
    ) -> impl Iterator<Item = (ApplicationId, &Application)> {
        self.applications
            .iter()
            .enumerate()
            .filter(move |(_, app)| app.unit == unit && app.domain == Some(domain))
            .map(|(idx, app)| (ApplicationId(idx), app))
    }

    /// Services attached to an application entity of the same tier.
    pub fn services_of(&self, app: ApplicationId) -> impl Iterator<Item = (ServiceId, &Service)> {
        self.services
            .iter()
            .enumerate()
            .filter(move |(_, svc)| svc.application == app)
            .map(|(idx, svc)| (ServiceId(idx), svc))
    }

    pub fn endpoints_of(&self, service: ServiceId) -> impl Iterator<Item = (EndpointId, &Endpoint)> {
        self.endpoints
            .iter()
            .enumerate()
            .filter(move |(_, ep)| ep.service == service)
            .map(|(idx, ep)| (EndpointId(idx), ep))
    }

    /// Endpoints consumed by a deployment-tier application.
    pub fn consumed_endpoints_of(
        &self,
        app: ApplicationId,
    ) -> impl Iterator<Item = (EndpointId, &Endpoint)> {
        self.endpoints
            .iter()
            .enumerate()
            .filter(move |(_, ep)| ep.consumers.contains(&app))
            .map(|(idx, ep)| (EndpointId(idx), ep))
    }

    /// Every endpoint reachable from the catalog, in arena order.
    pub fn all_endpoints(&self) -> impl Iterator<Item = (EndpointId, &Endpoint)> {
        self.endpoints
            .iter()
            .enumerate()
            .map(|(idx, ep)| (EndpointId(idx), ep))
    }
}
