use crate::model::{CoreConfiguration, ServiceAccount};
use crate::steps::StepStatus;

/// Core-configuration step: connector name plus service-account credentials.
///
/// Completeness: name, client id and client secret non-empty, and the
/// explicit confirmation flag when required (duplicate mode carries the
/// source connector's credentials, which the user must re-confirm). With
/// `credentials_optional` (edit mode) the credential fields may be left
/// empty together, meaning "keep the stored credentials".
pub struct CoreConfigStep {
    name: String,
    client_id: String,
    client_secret: String,
    account_confirmed: bool,
    require_confirmation: bool,
    credentials_optional: bool,
    status: StepStatus,
}

impl CoreConfigStep {
    pub fn new(require_confirmation: bool, credentials_optional: bool) -> Self {
        let mut step = Self {
            name: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            account_confirmed: false,
            require_confirmation,
            credentials_optional,
            status: StepStatus::Typing,
        };
        step.verify();
        step
    }

    pub fn hydrate(
        config: &CoreConfiguration,
        require_confirmation: bool,
        credentials_optional: bool,
    ) -> Self {
        let mut step = Self {
            name: config.name.clone(),
            client_id: config.service_account.client_id.clone(),
            client_secret: config.service_account.client_secret.clone(),
            account_confirmed: config.account_confirmed,
            require_confirmation,
            credentials_optional,
            status: StepStatus::Typing,
        };
        step.verify();
        step
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn account_confirmed(&self) -> bool {
        self.account_confirmed
    }

    fn complete(&self) -> bool {
        if self.name.trim().is_empty() {
            return false;
        }
        if self.credentials_optional {
            // Either both provided or both left as "keep existing".
            if self.client_id.is_empty() != self.client_secret.is_empty() {
                return false;
            }
        } else if self.client_id.is_empty() || self.client_secret.is_empty() {
            return false;
        }
        if self.require_confirmation && !self.account_confirmed {
            return false;
        }
        true
    }

    fn verify(&mut self) -> StepStatus {
        self.status = if self.complete() {
            StepStatus::Valid
        } else {
            StepStatus::Typing
        };
        self.status
    }

    pub fn set_name(&mut self, name: &str) -> StepStatus {
        self.name = name.to_string();
        self.verify()
    }

    pub fn set_client_id(&mut self, client_id: &str) -> StepStatus {
        self.client_id = client_id.to_string();
        self.verify()
    }

    pub fn set_client_secret(&mut self, client_secret: &str) -> StepStatus {
        self.client_secret = client_secret.to_string();
        self.verify()
    }

    pub fn set_account_confirmed(&mut self, confirmed: bool) -> StepStatus {
        self.account_confirmed = confirmed;
        self.verify()
    }

    pub fn confirm(&mut self) -> Option<CoreConfiguration> {
        if !self.complete() {
            return None;
        }
        self.status = StepStatus::Done;
        Some(CoreConfiguration {
            name: self.name.clone(),
            service_account: ServiceAccount {
                client_id: self.client_id.clone(),
                client_secret: self.client_secret.clone(),
            },
            account_confirmed: self.account_confirmed,
        })
    }
}
