//! SoftLayer API data types

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datacenter {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub long_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerState {
    pub key_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Password {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OperatingSystem {
    #[serde(default)]
    pub passwords: Vec<Password>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingItem {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualGuest {
    pub id: i64,
    pub hostname: String,
    #[serde(default)]
    pub domain: Option<String>,
    /// Expanded by the `billingItem` object mask
    #[serde(default)]
    pub billing_item: Option<BillingItem>,
    /// Flat id returned when the relation is not expanded
    #[serde(default, rename = "billingItemId", skip_serializing_if = "Option::is_none")]
    pub flat_billing_item_id: Option<i64>,
    #[serde(default)]
    pub primary_ip_address: Option<String>,
    #[serde(default)]
    pub primary_backend_ip_address: Option<String>,
    #[serde(default)]
    pub power_state: Option<PowerState>,
    #[serde(default)]
    pub operating_system: Option<OperatingSystem>,
    #[serde(default)]
    pub datacenter: Option<Datacenter>,
    #[serde(default)]
    pub max_cpu: Option<u32>,
    #[serde(default)]
    pub max_memory: Option<u64>,
}

impl VirtualGuest {
    /// Backend IP, public IP and at least one OS password are all present
    pub fn has_login_details(&self) -> bool {
        self.primary_backend_ip_address.is_some()
            && self.primary_ip_address.is_some()
            && self
                .operating_system
                .as_ref()
                .is_some_and(|os| !os.passwords.is_empty())
    }

    pub fn first_password(&self) -> Option<&Password> {
        self.operating_system.as_ref()?.passwords.first()
    }

    /// `None` when the guest has nothing left to cancel
    pub fn billing_item_id(&self) -> Option<i64> {
        self.billing_item
            .map(|item| item.id)
            .or(self.flat_billing_item_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductItemPrice {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_recurring_fee: Option<String>,
}

impl ProductItemPrice {
    pub fn id(id: i64) -> Self {
        Self {
            id,
            item_id: None,
            hourly_recurring_fee: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductItemCategory {
    pub category_code: String,
}

/// Something orderable: a CPU tier, RAM size, disk, OS, ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductItem {
    pub id: i64,
    pub description: String,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub capacity: Option<f32>,
    #[serde(default)]
    pub prices: Vec<ProductItemPrice>,
    #[serde(default)]
    pub categories: Vec<ProductItemCategory>,
}

impl ProductItem {
    pub fn has_category(&self, code: &str) -> bool {
        self.categories.iter().any(|c| c.category_code == code)
    }

    /// Price id used when ordering this item
    pub fn price_id(&self) -> Option<i64> {
        self.prices.first().map(|p| p.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPackage {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<ProductItem>,
    #[serde(default)]
    pub datacenters: Vec<Datacenter>,
}

/// Guest section of an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewVirtualGuest {
    pub hostname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOrder {
    pub complex_type: &'static str,
    pub package_id: i64,
    /// Datacenter id
    pub location: String,
    pub quantity: u32,
    pub use_hourly_pricing: bool,
    pub prices: Vec<ProductItemPrice>,
    pub virtual_guests: Vec<NewVirtualGuest>,
}

impl ProductOrder {
    pub const VIRTUAL_GUEST_ORDER: &'static str = "SoftLayer_Container_Product_Order_Virtual_Guest";
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(default)]
    pub virtual_guests: Vec<VirtualGuest>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOrderReceipt {
    pub order_id: i64,
    #[serde(default)]
    pub order_details: OrderDetails,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_details() {
        let mut guest: VirtualGuest = serde_json::from_value(json!({
            "id": 1, "hostname": "web-n1",
            "primaryIpAddress": "203.0.113.5",
            "primaryBackendIpAddress": "10.0.0.5"
        }))
        .unwrap();
        assert_eq!(guest.billing_item_id(), None);
        assert!(!guest.has_login_details());

        guest.operating_system = Some(OperatingSystem {
            passwords: vec![Password {
                username: "root".to_string(),
                password: "pw".to_string(),
            }],
        });
        assert!(guest.has_login_details());
        assert_eq!(guest.first_password().map(|p| p.username.as_str()), Some("root"));
    }

    #[test]
    fn test_order_wire_shape() {
        let order = ProductOrder {
            complex_type: ProductOrder::VIRTUAL_GUEST_ORDER,
            package_id: 46,
            location: "3".to_string(),
            quantity: 1,
            use_hourly_pricing: true,
            prices: vec![ProductItemPrice::id(1639)],
            virtual_guests: vec![NewVirtualGuest {
                hostname: "web-n1".to_string(),
                domain: None,
            }],
        };
        assert_eq!(
            serde_json::to_value(&order).unwrap(),
            json!({
                "complexType": "SoftLayer_Container_Product_Order_Virtual_Guest",
                "packageId": 46,
                "location": "3",
                "quantity": 1,
                "useHourlyPricing": true,
                "prices": [{"id": 1639}],
                "virtualGuests": [{"hostname": "web-n1"}]
            })
        );
    }

    #[test]
    fn test_billing_item_from_mask_or_flat_id() {
        let nested: VirtualGuest = serde_json::from_value(json!({
            "id": 1, "hostname": "web-n1", "billingItem": {"id": 900}
        }))
        .unwrap();
        assert_eq!(nested.billing_item_id(), Some(900));

        let flat: VirtualGuest = serde_json::from_value(json!({
            "id": 1, "hostname": "web-n1", "billingItemId": 901
        }))
        .unwrap();
        assert_eq!(flat.billing_item_id(), Some(901));
    }
}
