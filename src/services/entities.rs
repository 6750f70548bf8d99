use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::envelope::Shape;
use super::resource::{Endpoint, ResourceService};
use crate::http::ApiClient;
use crate::types::{CompanyId, Id};

/// A server row passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// The `id` field, if the server sent one as a string or integer.
    #[must_use]
    pub fn id(&self) -> Option<Id> {
        match self.0.get("id")? {
            Value::String(s) => Some(Id(s.clone())),
            Value::Number(n) => Some(Id(n.to_string())),
            _ => None,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Business entities exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[non_exhaustive]
pub enum EntityKind {
    #[display("company")]
    Company,
    #[display("employee")]
    Employee,
    #[display("contract")]
    Contract,
    #[display("benefit")]
    Benefit,
    #[display("account")]
    Account,
    #[display("transaction")]
    Transaction,
    #[display("loan")]
    Loan,
    #[display("third party")]
    ThirdParty,
    #[display("cost center")]
    CostCenter,
    #[display("purchase order")]
    PurchaseOrder,
    #[display("task type")]
    TaskType,
    #[display("role")]
    Role,
    #[display("user")]
    User,
}

impl EntityKind {
    pub const ALL: [Self; 13] = [
        Self::Company,
        Self::Employee,
        Self::Contract,
        Self::Benefit,
        Self::Account,
        Self::Transaction,
        Self::Loan,
        Self::ThirdParty,
        Self::CostCenter,
        Self::PurchaseOrder,
        Self::TaskType,
        Self::Role,
        Self::User,
    ];

    /// REST path segment of the collection.
    #[must_use]
    pub fn segment(self) -> &'static str {
        match self {
            Self::Company => "empresas",
            Self::Employee => "funcionarios",
            Self::Contract => "contratos",
            Self::Benefit => "beneficios-descontos",
            Self::Account => "contas",
            Self::Transaction => "transacoes",
            Self::Loan => "emprestimos",
            Self::ThirdParty => "terceiros",
            Self::CostCenter => "centros-custo",
            Self::PurchaseOrder => "pedidos-compra",
            Self::TaskType => "tipos-tarefa",
            Self::Role => "perfis",
            Self::User => "usuarios",
        }
    }

    /// Whether the collection lives under `/empresas/{id}/`.
    #[must_use]
    pub fn is_company_scoped(self) -> bool {
        !matches!(self, Self::Company | Self::Role | Self::User)
    }

    /// Success body shape the endpoint answers with.
    #[must_use]
    pub fn shape(self) -> Shape {
        match self {
            Self::Employee | Self::Contract | Self::Benefit | Self::PurchaseOrder | Self::User => {
                Shape::Wrapped
            }
            _ => Shape::Raw,
        }
    }

    /// Endpoint of this entity. `company` is ignored for top-level entities.
    ///
    /// Returns `None` for a company-scoped entity without a company.
    #[must_use]
    pub fn endpoint(self, company: Option<&CompanyId>) -> Option<Endpoint> {
        match (self.is_company_scoped(), company) {
            (false, _) => Some(self.top_level_endpoint()),
            (true, Some(company)) => Some(self.scoped_endpoint(company)),
            (true, None) => None,
        }
    }

    fn top_level_endpoint(self) -> Endpoint {
        Endpoint::new(format!("/{}", self.segment())).with_shape(self.shape())
    }

    fn scoped_endpoint(self, company: &CompanyId) -> Endpoint {
        let collection = format!(
            "/empresas/{}/{}",
            urlencoding::encode(company.0.as_str()),
            self.segment()
        );
        Endpoint::new(collection).with_shape(self.shape())
    }
}

/// Entry point to every entity service.
///
/// ```rust,ignore
/// let api = ErpApi::new(client);
/// let accounts = api.accounts(&CompanyId::from(5u64)).list(&ListParams::new().page(1)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ErpApi {
    client: ApiClient,
}

impl ErpApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn top_level(&self, kind: EntityKind) -> ResourceService<Record> {
        ResourceService::new(self.client.clone(), kind.top_level_endpoint())
    }

    fn scoped(&self, kind: EntityKind, company: &CompanyId) -> ResourceService<Record> {
        ResourceService::new(self.client.clone(), kind.scoped_endpoint(company))
    }

    #[must_use]
    pub fn companies(&self) -> ResourceService<Record> {
        self.top_level(EntityKind::Company)
    }

    #[must_use]
    pub fn roles(&self) -> ResourceService<Record> {
        self.top_level(EntityKind::Role)
    }

    #[must_use]
    pub fn users(&self) -> ResourceService<Record> {
        self.top_level(EntityKind::User)
    }

    #[must_use]
    pub fn employees(&self, company: &CompanyId) -> ResourceService<Record> {
        self.scoped(EntityKind::Employee, company)
    }

    #[must_use]
    pub fn contracts(&self, company: &CompanyId) -> ResourceService<Record> {
        self.scoped(EntityKind::Contract, company)
    }

    #[must_use]
    pub fn benefits(&self, company: &CompanyId) -> ResourceService<Record> {
        self.scoped(EntityKind::Benefit, company)
    }

    #[must_use]
    pub fn accounts(&self, company: &CompanyId) -> ResourceService<Record> {
        self.scoped(EntityKind::Account, company)
    }

    #[must_use]
    pub fn transactions(&self, company: &CompanyId) -> ResourceService<Record> {
        self.scoped(EntityKind::Transaction, company)
    }

    #[must_use]
    pub fn loans(&self, company: &CompanyId) -> ResourceService<Record> {
        self.scoped(EntityKind::Loan, company)
    }

    #[must_use]
    pub fn third_parties(&self, company: &CompanyId) -> ResourceService<Record> {
        self.scoped(EntityKind::ThirdParty, company)
    }

    #[must_use]
    pub fn cost_centers(&self, company: &CompanyId) -> ResourceService<Record> {
        self.scoped(EntityKind::CostCenter, company)
    }

    #[must_use]
    pub fn purchase_orders(&self, company: &CompanyId) -> ResourceService<Record> {
        self.scoped(EntityKind::PurchaseOrder, company)
    }

    #[must_use]
    pub fn task_types(&self, company: &CompanyId) -> ResourceService<Record> {
        self.scoped(EntityKind::TaskType, company)
    }

    /// Service for any entity with a custom record type.
    ///
    /// Returns `None` for a company-scoped entity without a company.
    #[must_use]
    pub fn resource<T: serde::de::DeserializeOwned>(
        &self,
        kind: EntityKind,
        company: Option<&CompanyId>,
    ) -> Option<ResourceService<T>> {
        kind.endpoint(company)
            .map(|endpoint| ResourceService::new(self.client.clone(), endpoint))
    }
}
