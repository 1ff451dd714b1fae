//! Process identity shared by everything that persists per-user state.

/// Organization and application names, fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub organization_name: String,
    pub organization_domain: String,
    pub application_name: String,
}

impl ProcessIdentity {
    pub fn new(organization_name: &str, organization_domain: &str, application_name: &str) -> Self {
        Self {
            organization_name: organization_name.to_string(),
            organization_domain: organization_domain.to_string(),
            application_name: application_name.to_string(),
        }
    }

    /// Qualifier used for platform config directories (`org` for `openchemistry.org`)
    pub fn qualifier(&self) -> &str {
        self.organization_domain.rsplit('.').next().unwrap_or("")
    }

    /// Reverse-DNS application id, e.g. `org.openchemistry.Avogadro`
    pub fn app_id(&self) -> String {
        let mut parts: Vec<&str> = self.organization_domain.split('.').filter(|p| !p.is_empty()).collect();
        parts.reverse();
        parts.push(&self.application_name);
        parts.join(".")
    }
}

impl Default for ProcessIdentity {
    fn default() -> Self {
        Self::new("OpenChemistry", "openchemistry.org", "Avogadro")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identity() {
        let identity = ProcessIdentity::default();
        assert_eq!(identity.organization_name, "OpenChemistry");
        assert_eq!(identity.organization_domain, "openchemistry.org");
        assert_eq!(identity.application_name, "Avogadro");
    }

    #[test]
    fn test_qualifier_is_top_level_label() {
        assert_eq!(ProcessIdentity::default().qualifier(), "org");
        assert_eq!(ProcessIdentity::new("Acme", "labs.acme.co.uk", "Viewer").qualifier(), "uk");
    }

    #[test]
    fn test_app_id_reverses_domain() {
        assert_eq!(ProcessIdentity::default().app_id(), "org.openchemistry.Avogadro");
        assert_eq!(ProcessIdentity::new("Acme", "", "Viewer").app_id(), "Viewer");
    }
}
