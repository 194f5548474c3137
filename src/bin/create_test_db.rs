use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use serde::Deserialize;

use mumu::{
    FraudRecord, FraudRecordBuilder, PasswordHash, ValidatedPassword, create_record, create_user,
    initialize_db,
};

const CUSTOMER_TYPES: [&str; 2] = ["Individual", "Business"];
const MERCHANT_CATEGORIES: [&str; 5] = ["Electronics", "Grocery", "Travel", "Fashion", "Gaming"];
const PAYMENT_STATUSES: [&str; 3] = ["Completed", "Pending", "Declined"];

/// A utility for creating a test database for the MUMU dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// A CSV file of fraud records to import instead of the generated sample records.
    #[arg(long, short)]
    records_path: Option<String>,

    /// The number of sample records to generate.
    #[arg(long, short, default_value_t = 200)]
    count: usize,
}

/// A row of a fraud record CSV file.
#[derive(Debug, Deserialize)]
struct RecordRow {
    transaction_id: String,
    customer_id: String,
    #[serde(default)]
    customer_type: String,
    #[serde(default)]
    account_age_days: i64,
    transaction_amount: f64,
    #[serde(default)]
    merchant_category: String,
    #[serde(default)]
    payment_status: String,
    fraud_label: String,
    #[serde(default)]
    fraud_score: f64,
}

impl From<RecordRow> for FraudRecordBuilder {
    fn from(row: RecordRow) -> Self {
        let fraud_label = matches!(row.fraud_label.trim().to_lowercase().as_str(), "1" | "true");

        FraudRecord::build(&row.transaction_id, &row.customer_id, row.transaction_amount)
            .customer_type(&row.customer_type)
            .account_age_days(row.account_age_days)
            .merchant_category(&row.merchant_category)
            .payment_status(&row.payment_status)
            .fraud_label(fraud_label)
            .fraud_score(row.fraud_score)
    }
}

/// Deterministic sample records, roughly one in seven labelled as fraud.
fn sample_records(count: usize) -> Vec<FraudRecordBuilder> {
    (0..count)
        .map(|i| {
            let is_fraud = i % 7 == 3;
            let amount = ((i * 7919) % 50_000) as f64 / 100.0 + 1.0;
            let fraud_score = if is_fraud {
                0.7 + (i % 30) as f64 / 100.0
            } else {
                (i % 40) as f64 / 100.0
            };

            FraudRecord::build(&format!("TX-{:05}", i + 1), &format!("CUST-{:04}", i % 97), amount)
                .customer_type(CUSTOMER_TYPES[i % CUSTOMER_TYPES.len()])
                .account_age_days(((i * 37) % 1500) as i64)
                .merchant_category(MERCHANT_CATEGORIES[i % MERCHANT_CATEGORIES.len()])
                .payment_status(PAYMENT_STATUSES[i % PAYMENT_STATUSES.len()])
                .fraud_label(is_fraud)
                .fraud_score(fraud_score)
        })
        .collect()
}

fn read_records(path: &Path) -> Result<Vec<FraudRecordBuilder>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();

    for row in reader.deserialize::<RecordRow>() {
        records.push(row?.into());
    }

    Ok(records)
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("demo"),
        PasswordHash::DEFAULT_COST,
    )?;
    create_user("demo", "demo@example.com", password_hash, &conn)?;

    let records = match &args.records_path {
        Some(records_path) => {
            println!("Importing fraud records from {records_path}...");
            read_records(Path::new(records_path))?
        }
        None => {
            println!("Creating {} sample fraud records...", args.count);
            sample_records(args.count)
        }
    };

    let transaction = conn.unchecked_transaction()?;
    let mut skipped = 0;
    for record in records {
        match create_record(record, &transaction) {
            Ok(_) => {}
            Err(error) => {
                eprintln!("Skipping record: {error}");
                skipped += 1;
            }
        }
    }
    transaction.commit()?;

    if skipped > 0 {
        println!("Skipped {skipped} records.");
    }

    println!("Success! Log in with the username 'demo' and the password 'demo'.");

    Ok(())
}
