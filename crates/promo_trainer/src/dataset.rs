//! Promotion CSV loading
//!
//! Tables come from a local path or an `http(s)://` URL. Numeric columns are
//! kept as raw strings here, since exports carry tokens like `NA` or `NaN`;
//! they are coerced during preprocessing.

use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::DataError;

/// One product/day row of promotion data
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PromotionRecord {
    #[serde(rename = "Tanggal")]
    pub date: String,
    #[serde(rename = "Harga_Jual")]
    pub price: Option<String>,
    #[serde(rename = "Diskon")]
    pub discount: Option<String>,
    #[serde(rename = "Stok_Harian")]
    pub daily_stock: Option<String>,
    #[serde(rename = "Stok_Aging")]
    pub stock_aging: Option<String>,
    #[serde(rename = "Jumlah_Terjual")]
    pub units_sold: Option<String>,
    #[serde(rename = "Produk")]
    pub product: String,
    #[serde(rename = "Kategori")]
    pub category: String,
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "Jenis_Promo")]
    pub promo_type: String,
    #[serde(rename = "Musim")]
    pub season: String,
    #[serde(rename = "Cuaca")]
    pub weather: String,
    #[serde(rename = "Event_Lokal")]
    pub local_event: String,
}

impl PromotionRecord {
    /// Raw value of a categorical column by its CSV header
    pub fn categorical(&self, column: &str) -> Option<&str> {
        let value = match column {
            "Produk" => &self.product,
            "Kategori" => &self.category,
            "Brand" => &self.brand,
            "Jenis_Promo" => &self.promo_type,
            "Musim" => &self.season,
            "Cuaca" => &self.weather,
            "Event_Lokal" => &self.local_event,
            _ => return None,
        };
        Some(value.as_str())
    }
}

/// Loaded table: records plus the header row they were read with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    pub headers: Vec<String>,
    pub records: Vec<PromotionRecord>,
}

impl RecordTable {
    /// Parse CSV with a header row from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let records = rdr
            .deserialize::<PromotionRecord>()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { headers, records })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.records.len(), self.headers.len())
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Download a table body; large exports may be slow, so no request timeout
fn fetch_remote(url: &str) -> Result<String, DataError> {
    debug!("Fetching {}", url);
    let client = reqwest::blocking::Client::builder()
        .timeout(None::<Duration>)
        .build()?;
    let response = client.get(url).send()?.error_for_status()?;
    Ok(response.text()?)
}

/// Load a table from a local path or an HTTP(S) URL
pub fn load_table(location: &str) -> Result<RecordTable, DataError> {
    let table = if is_remote(location) {
        let body = fetch_remote(location)?;
        RecordTable::from_reader(body.as_bytes())?
    } else {
        RecordTable::from_path(location)?
    };

    info!("Loaded {} rows from {}", table.len(), location);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Tanggal,Produk,Kategori,Brand,Harga_Jual,Jenis_Promo,Diskon,Stok_Harian,Stok_Aging,Musim,Cuaca,Event_Lokal,Jumlah_Terjual";

    fn create_test_csv() -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "{HEADER}")?;
        writeln!(file, "2024-01-01,Oreo,Biskuit,Nabisco,9500,Diskon Persen,10,120,3,Hujan,Cerah,Tidak Ada,25")?;
        writeln!(file, "2024-01-02,Aqua,Minuman,Danone,4000,Tidak Ada Promo,0,300,abc,Hujan,Hujan,Festival,")?;
        writeln!(file, "2024-01-03,Aqua,Minuman,Danone,,Tidak Ada Promo,0,280,1,Hujan,Cerah,,40")?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_csv() -> Result<()> {
        let file = create_test_csv()?;
        let table = RecordTable::from_path(file.path())?;

        assert_eq!(table.shape(), (3, 13));
        let first = &table.records[0];
        assert_eq!(first.date, "2024-01-01");
        assert_eq!(first.price.as_deref(), Some("9500"));
        assert_eq!(first.units_sold.as_deref(), Some("25"));
        assert_eq!(first.categorical("Jenis_Promo"), Some("Diskon Persen"));
        assert_eq!(first.categorical("Harga_Jual"), None);
        Ok(())
    }

    #[test]
    fn test_empty_fields() -> Result<()> {
        let file = create_test_csv()?;
        let table = load_table(&file.path().display().to_string())?;

        assert_eq!(table.records[1].stock_aging.as_deref(), Some("abc"));
        assert_eq!(table.records[1].units_sold, None);
        assert_eq!(table.records[2].price, None);
        assert_eq!(table.records[2].local_event, "");
        Ok(())
    }

    #[test]
    fn test_na_tokens_load_as_text() -> Result<()> {
        let csv = format!(
            "{HEADER}\n2024-02-01,A,B,C,NA,D,NaN,N/A,1,E,F,G,2\n"
        );
        let table = RecordTable::from_reader(csv.as_bytes())?;
        let record = &table.records[0];
        assert_eq!(record.price.as_deref(), Some("NA"));
        assert_eq!(record.discount.as_deref(), Some("NaN"));
        assert_eq!(record.daily_stock.as_deref(), Some("N/A"));
        Ok(())
    }

    #[test]
    fn test_load_from_url() -> Result<()> {
        use std::io::{BufRead, BufReader};
        use std::net::TcpListener;

        let body = format!("{HEADER}\n2024-02-01,A,B,C,1500,D,0,10,1,E,F,G,2\n");
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;

        let server = std::thread::spawn(move || -> std::io::Result<()> {
            let (mut stream, _) = listener.accept()?;
            let mut reader = BufReader::new(stream.try_clone()?);
            let mut line = String::new();
            while reader.read_line(&mut line)? > 0 && line != "\r\n" {
                line.clear();
            }
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            )?;
            stream.flush()
        });

        let table = load_table(&format!("http://{addr}/train.csv"))?;
        server.join().map_err(|_| anyhow::anyhow!("server thread panicked"))??;

        assert_eq!(table.shape(), (1, 13));
        assert_eq!(table.records[0].price.as_deref(), Some("1500"));
        Ok(())
    }

    #[test]
    fn test_extra_columns_are_ignored() -> Result<()> {
        let csv = format!("{HEADER},Catatan\n2024-02-01,A,B,C,1,D,0,1,1,E,F,G,2,ignored\n");
        let table = RecordTable::from_reader(csv.as_bytes())?;
        assert_eq!(table.shape(), (1, 14));
        Ok(())
    }

    #[test]
    fn test_missing_column_fails() {
        let csv = "Tanggal,Produk\n2024-02-01,A\n";
        assert!(matches!(
            RecordTable::from_reader(csv.as_bytes()),
            Err(DataError::Csv(_))
        ));
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(matches!(
            load_table("/nonexistent/promo.csv"),
            Err(DataError::Io(_))
        ));
    }
}
