//! Built-in dataset catalog
//!
//! The project trains on two public traffic-sign datasets:
//! - GTSDB (Full IJCNN 2013 archive, fetched over plain HTTP)
//! - LISA traffic light dataset (hosted on Kaggle)

use serde::{Deserialize, Serialize};

/// A dataset the project knows how to fetch
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DatasetSpec {
    /// Directory name under the data directory
    pub name: String,
    pub description: String,
    pub homepage: String,
    /// Human readable size, e.g. "~2.7GB"
    pub approx_size: String,
    pub source: DatasetSource,
    /// Where to send the user when the automatic download fails
    pub manual_url: String,
}

/// How a dataset is retrieved
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetSource {
    /// Archive fetched over HTTP(S) and unpacked into the data directory
    Http {
        url: String,
        archive_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sha256: Option<String>,
    },
    /// Kaggle dataset handle (`owner/dataset`)
    Kaggle { handle: String },
}

impl DatasetSource {
    /// Short label used in logs and the dataset README
    pub fn method(&self) -> &'static str {
        match self {
            DatasetSource::Http { .. } => "direct download",
            DatasetSource::Kaggle { .. } => "Kaggle API",
        }
    }
}

pub fn gtsdb() -> DatasetSpec {
    DatasetSpec {
        name: "GTSDB".to_string(),
        description: "German traffic sign images with annotations".to_string(),
        homepage: "http://benchmark.ini.rub.de/".to_string(),
        approx_size: "~2.7GB".to_string(),
        source: DatasetSource::Http {
            url: "https://sid.erda.dk/public/archives/ff17dc924eba88d5d01a807357d6614c/FullIJCNN2013.zip"
                .to_string(),
            archive_name: "FullIJCNN2013.zip".to_string(),
            sha256: None,
        },
        manual_url: "https://sid.erda.dk/public/archives/ff17dc924eba88d5d01a807357d6614c/published-archive.html"
            .to_string(),
    }
}

pub fn lisa() -> DatasetSpec {
    DatasetSpec {
        name: "LISA".to_string(),
        description: "US traffic sign images with annotations".to_string(),
        homepage: "https://www.kaggle.com/datasets/mbornoe/lisa-traffic-light-dataset"
            .to_string(),
        approx_size: "~4.9GB".to_string(),
        source: DatasetSource::Kaggle {
            handle: "mbornoe/lisa-traffic-light-dataset".to_string(),
        },
        manual_url: "https://www.kaggle.com/datasets/mbornoe/lisa-traffic-light-dataset"
            .to_string(),
    }
}

/// Default catalog, in download order
pub fn builtin() -> Vec<DatasetSpec> {
    vec![gtsdb(), lisa()]
}
