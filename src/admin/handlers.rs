use serde::{Deserialize, Serialize};

use crate::health::VERSION;
use crate::routing::RouteTable;

/// Information about a registered backend service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub prefix: String,
    pub status: String,
}

/// Gateway status with the registered services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayStatus {
    pub status: String,
    pub version: String,
    pub services: Vec<ServiceInfo>,
}

/// One entry per configured route, in configuration order.
pub fn list_services(table: &RouteTable) -> Vec<ServiceInfo> {
    table
        .routes()
        .iter()
        .map(|route| ServiceInfo {
            name: route.name().to_string(),
            prefix: route.prefix().to_string(),
            status: "configured".to_string(),
        })
        .collect()
}

pub fn gateway_status(table: &RouteTable) -> GatewayStatus {
    GatewayStatus {
        status: "running".to_string(),
        version: VERSION.to_string(),
        services: list_services(table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;

    #[test]
    fn test_status_lists_routes() {
        let table = RouteTable::load(&[
            RouteConfig::new("service1", "/api/service1", "http://svc1:8001"),
            RouteConfig::new("service2", "/api/service2/", "http://svc2:8002"),
        ])
        .unwrap();

        let status = gateway_status(&table);
        assert_eq!(status.status, "running");
        assert_eq!(status.version, VERSION);
        assert_eq!(
            status.services,
            vec![
                ServiceInfo {
                    name: "service1".into(),
                    prefix: "/api/service1".into(),
                    status: "configured".into(),
                },
                ServiceInfo {
                    name: "service2".into(),
                    prefix: "/api/service2".into(),
                    status: "configured".into(),
                },
            ]
        );
    }

    #[test]
    fn test_empty_table() {
        assert!(list_services(&RouteTable::default()).is_empty());
    }
}
