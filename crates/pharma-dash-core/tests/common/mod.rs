//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use pharma_dash_core::InventoryRecord;

pub const HEADER: &str = "Medicine Name,Batch Number,Category,Dosage Form,Strength,Count,Reorder Level,Cost Price ($),Selling Price ($),Profit Margin (%),Expiry Date,Manufacture Date,Supplier Name,Warehouse Location,Prescription Required,Days to Expiry,Units Sold,Discount (%),Target Ailment";

/// Three rows: MedA and MedC in category X, MedB in Y. MedC sold nothing
/// and has no listed margin, so its margin is missing.
pub fn three_row_csv() -> String {
    [
        HEADER,
        "MedA,BATCH-0000001,X,Tablet,500mg,100,20,5.00,10.00,25.5,2026-01-01,2024-01-01,Supplier W,Warehouse A,Yes,200,50,5,Pain",
        "MedB,BATCH-0000002,Y,Syrup,10ml,40,30,2.00,3.00,12.0,2026-02-01,2024-02-01,Supplier X,Warehouse B,No,20,5,0,Fever",
        "MedC,BATCH-0000003,X,Capsule,250mg,10,50,1.00,2.00,,2025-12-01,2024-03-01,Supplier W,Warehouse A,Yes,10,0,10,Pain",
    ]
    .join("\n")
}

/// The three rows of the worked example, without a listed margin column.
pub fn worked_example_csv() -> String {
    [
        "Medicine Name,Batch Number,Category,Dosage Form,Count,Reorder Level,Cost Price ($),Selling Price ($),Expiry Date,Manufacture Date,Supplier Name,Warehouse Location,Prescription Required,Days to Expiry,Units Sold,Discount (%),Target Ailment",
        "MedA,BATCH-0000001,X,Tablet,100,20,5,10,2026-01-01,2024-01-01,Supplier W,Warehouse A,Yes,200,50,0,Pain",
        "MedB,BATCH-0000002,Y,Syrup,10,50,2,3,2026-02-01,2024-02-01,Supplier X,Warehouse B,No,20,5,0,Fever",
        "MedC,BATCH-0000003,X,Capsule,40,10,1,1,2025-12-01,2024-03-01,Supplier W,Warehouse A,Yes,10,0,0,Pain",
    ]
    .join("\n")
}

pub fn record(name: &str, category: &str, count: u32) -> InventoryRecord {
    let mut record = InventoryRecord::new(name, category);
    record.batch_number = format!("BATCH-{name}");
    record.dosage_form = "Tablet".into();
    record.supplier_name = "Supplier W".into();
    record.warehouse_location = "Warehouse A".into();
    record.target_ailment = "Pain".into();
    record.count = count;
    record
}
