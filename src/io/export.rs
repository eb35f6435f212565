use anyhow::Result;
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{format_cents, CustomerNumber, PageRequest, TenantNumber};

/// Exporter for writing ledger views to CSV or JSON.
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export one page of the audit trail as CSV. Returns the number of rows written.
    pub async fn export_audit_csv<W: Write>(
        &self,
        writer: W,
        tenant_number: TenantNumber,
        customer_number: CustomerNumber,
        page: PageRequest,
    ) -> Result<usize> {
        let records = self
            .service
            .audit(tenant_number, customer_number, page)
            .await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["tenant", "customer", "amount", "operation", "time"])?;

        for record in &records {
            let amount = format_cents(record.amount_cents);
            csv_writer.write_record([
                record.tenant_name.as_str(),
                record.customer_name.as_str(),
                amount.as_str(),
                record.operation.as_str(),
                record.time.as_str(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(records.len())
    }

    /// Export one page of account statements as pretty JSON.
    /// Returns the number of statements written.
    pub async fn export_statements_json<W: Write>(
        &self,
        mut writer: W,
        tenant_number: TenantNumber,
        customer_number: CustomerNumber,
        page: PageRequest,
    ) -> Result<usize> {
        let statements = self
            .service
            .list(tenant_number, customer_number, page)
            .await?;

        serde_json::to_writer_pretty(&mut writer, &statements)?;
        writeln!(writer)?;
        Ok(statements.len())
    }
}
