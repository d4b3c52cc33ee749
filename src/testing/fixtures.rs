//! Static request fixtures

use serde_json::{json, Value};

use crate::api::FilePart;

/// Column the cleaning and training requests target
pub const TARGET_COLUMN: &str = "species";

pub const UPLOAD_FILE_NAME: &str = "test_iris.csv";

/// Fifteen iris-like rows, five per species
pub const IRIS_CSV: &str = "\
sepal_length,sepal_width,petal_length,petal_width,species
5.1,3.5,1.4,0.2,setosa
4.9,3.0,1.4,0.2,setosa
4.7,3.2,1.3,0.2,setosa
4.6,3.1,1.5,0.2,setosa
5.0,3.6,1.4,0.2,setosa
7.0,3.2,4.7,1.4,versicolor
6.4,3.2,4.5,1.5,versicolor
6.9,3.1,4.9,1.5,versicolor
5.5,2.3,4.0,1.3,versicolor
6.5,2.8,4.6,1.5,versicolor
6.3,3.3,6.0,2.5,virginica
5.8,2.7,5.1,1.9,virginica
7.1,3.0,5.9,2.1,virginica
6.3,2.9,5.6,1.8,virginica
6.5,3.0,5.8,2.2,virginica";

/// Supervised model exercised by parameter lookup and training
pub const SUPERVISED_MODEL: &str = "Logistic Regression";
pub const SUPERVISED_CATEGORY: &str = "classification";
/// Unsupervised model exercised by parameter lookup
pub const UNSUPERVISED_MODEL: &str = "K-Means";

/// The upload fixture as a multipart file part
pub fn iris_upload() -> FilePart {
    FilePart {
        field: "file".to_string(),
        file_name: UPLOAD_FILE_NAME.to_string(),
        content_type: "text/csv".to_string(),
        data: IRIS_CSV.as_bytes().to_vec(),
    }
}

/// Hyperparameters sent with the training request
pub fn training_parameters() -> Value {
    json!({"C": 1.0, "max_iter": 100})
}
