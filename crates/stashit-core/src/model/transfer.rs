use crate::model::{Fingerprint, Identity, PayloadOxum};
use serde::{Deserialize, Serialize};

/// Format of the `transfer_date` column (`YYYYMMDD`)
pub const TRANSFER_DATE_FORMAT: &str = "%Y%m%d";

/// A transfer about to be appended to the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransfer {
    pub identity: Identity,
    pub correlation_token: String,
    pub transfer_date: String,
    pub payload_oxum: PayloadOxum,
    pub fingerprint: Fingerprint,
    pub elapsed_seconds: f64,
}

impl NewTransfer {
    /// Today's date in the ledger's transfer date format (local time)
    pub fn today() -> String {
        chrono::Local::now().format(TRANSFER_DATE_FORMAT).to_string()
    }
}

/// A row of the append-only transfers table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub transfer_id: i64,
    pub identity: String,
    pub correlation_token: String,
    pub transfer_date: String,
    pub payload_oxum: String,
    pub fingerprint: String,
    pub elapsed_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_is_eight_digits() {
        let today = NewTransfer::today();
        assert_eq!(today.len(), 8);
        assert!(today.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_record_serializes_all_columns() {
        let record = TransferRecord {
            transfer_id: 1,
            identity: "demoA".into(),
            correlation_token: "tok".into(),
            transfer_date: "20260101".into(),
            payload_oxum: "10.2".into(),
            fingerprint: "ab".repeat(32),
            elapsed_seconds: 0.5,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["identity"], "demoA");
        assert_eq!(json["payload_oxum"], "10.2");
        assert_eq!(json["elapsed_seconds"], 0.5);
    }
}
