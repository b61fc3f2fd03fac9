//! SoftLayer REST operations
//!
//! Paths are relative to the API root; `{id}` comes from the call's path
//! params.

use nimbus_cloud::{
    NotFoundPolicy, OperationDescriptor, OperationTable, PayloadStrategy, ResponseStrategy,
};

const JSON: &str = "application/json";

/// Guest fields needed for readiness, credentials and node metadata
macro_rules! guest_mask {
    () => {
        "objectMask=powerState;operatingSystem.passwords;datacenter;billingItem"
    };
}

pub const GUEST_MASK: &str = guest_mask!();

pub static LIST_VIRTUAL_GUESTS: OperationDescriptor =
    OperationDescriptor::get("list_virtual_guests")
        .path(concat!("/SoftLayer_Account/VirtualGuests.json?", guest_mask!()))
        .consumes(JSON)
        .response(ResponseStrategy::Json);

pub static GET_VIRTUAL_GUEST: OperationDescriptor = OperationDescriptor::get("get_virtual_guest")
    .path(concat!("/SoftLayer_Virtual_Guest/{id}.json?", guest_mask!()))
    .consumes(JSON)
    .response(ResponseStrategy::Json)
    .not_found(NotFoundPolicy::ReturnNone);

pub static ORDER_VIRTUAL_GUEST: OperationDescriptor =
    OperationDescriptor::post("order_virtual_guest")
        .path("/SoftLayer_Product_Order/placeOrder.json")
        .produces(JSON)
        .consumes(JSON)
        .payload(PayloadStrategy::Json { arg: 0 })
        .response(ResponseStrategy::Json);

pub static CANCEL_SERVICE: OperationDescriptor = OperationDescriptor::get("cancel_service")
    .path("/SoftLayer_Billing_Item/{id}/cancelService.json")
    .consumes(JSON)
    .response(ResponseStrategy::Json);

pub static REBOOT_HARD_VIRTUAL_GUEST: OperationDescriptor =
    OperationDescriptor::get("reboot_hard_virtual_guest")
        .path("/SoftLayer_Virtual_Guest/{id}/rebootHard.json")
        .consumes(JSON)
        .response(ResponseStrategy::Void);

pub static PAUSE_VIRTUAL_GUEST: OperationDescriptor =
    OperationDescriptor::get("pause_virtual_guest")
        .path("/SoftLayer_Virtual_Guest/{id}/pause.json")
        .consumes(JSON)
        .response(ResponseStrategy::Void);

pub static RESUME_VIRTUAL_GUEST: OperationDescriptor =
    OperationDescriptor::get("resume_virtual_guest")
        .path("/SoftLayer_Virtual_Guest/{id}/resume.json")
        .consumes(JSON)
        .response(ResponseStrategy::Void);

pub static GET_ACTIVE_PACKAGES: OperationDescriptor =
    OperationDescriptor::get("get_active_packages")
        .path("/SoftLayer_Account/ActivePackages.json")
        .consumes(JSON)
        .response(ResponseStrategy::Json);

pub static GET_PRODUCT_PACKAGE: OperationDescriptor =
    OperationDescriptor::get("get_product_package")
        .path("/SoftLayer_Product_Package/{id}.json?objectMask=items.prices;items.categories;datacenters")
        .consumes(JSON)
        .response(ResponseStrategy::Json)
        .not_found(NotFoundPolicy::ReturnNone);

pub fn operations() -> OperationTable {
    OperationTable::new(&[
        &LIST_VIRTUAL_GUESTS,
        &GET_VIRTUAL_GUEST,
        &ORDER_VIRTUAL_GUEST,
        &CANCEL_SERVICE,
        &REBOOT_HARD_VIRTUAL_GUEST,
        &PAUSE_VIRTUAL_GUEST,
        &RESUME_VIRTUAL_GUEST,
        &GET_ACTIVE_PACKAGES,
        &GET_PRODUCT_PACKAGE,
    ])
}
