use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    request::Request, response_writer::ResponseWriter, server::Handler, status::Status,
};

lazy_static! {
    static ref CONTENT_TYPES: HashMap<&'static str, &'static str> = HashMap::from([
        ("css", "text/css"),
        ("html", "text/html"),
        ("js", "text/javascript"),
        ("json", "application/json"),
        ("txt", "text/plain"),
    ]);
}

fn content_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| CONTENT_TYPES.get(ext).copied())
        .unwrap_or("application/octet-stream")
}

/// Serves files below `base_path`. The file name is the request's
/// unmatched suffix: everything after the mount point the routing tree
/// consumed.
pub fn new_file_retriever(base_path: impl Into<PathBuf>) -> impl Handler {
    let base_path = base_path.into();
    move |w: &mut ResponseWriter, r: &mut Request| {
        let suffix = r.get_path_info();
        if suffix.is_empty() {
            w.set_status(Status::BadRequest);
            return;
        }

        let Ok(path) = build_path(&base_path, suffix) else {
            w.set_status(Status::BadRequest);
            return;
        };
        info!("file path: {:?}", path);

        match fs::read(&path) {
            Ok(contents) => {
                w.set_status(Status::OK);
                w.set_body(contents, content_type(&path));
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                w.set_status(Status::NotFound);
            }
            Err(err) => {
                error!("{:?}", err);
                w.set_status(Status::InternalServerError);
            }
        }
    }
}

/// Writes the request body to a file below `base_path`, again named by
/// the unmatched suffix.
pub fn new_file_writer(base_path: impl Into<PathBuf>) -> impl Handler {
    let base_path = base_path.into();
    move |w: &mut ResponseWriter, r: &mut Request| {
        let suffix = r.get_path_info();
        if suffix.is_empty() {
            w.set_status(Status::BadRequest);
            return;
        }

        let Ok(path) = build_path(&base_path, suffix) else {
            w.set_status(Status::BadRequest);
            return;
        };
        info!("file path: {:?}", path);

        let Some(body) = r.get_body() else {
            w.set_status(Status::BadRequest);
            return;
        };

        if let Some(parent) = path.parent() {
            if fs::create_dir_all(parent).is_err() {
                w.set_status(Status::InternalServerError);
                return;
            }
        }

        if let Err(err) = fs::write(path, body) {
            error!("{}", err);
            w.set_status(Status::InternalServerError);
            return;
        }

        w.set_status(Status::Created);
    }
}

#[derive(Error, Debug)]
#[error("invalid path")]
struct InvalidPath;

fn build_path(
    base_path: impl AsRef<Path>,
    suffix: impl AsRef<Path>,
) -> Result<PathBuf, InvalidPath> {
    let path = path_clean::clean(base_path.as_ref().join(&suffix));

    let stripped = if let Ok(stripped) = base_path.as_ref().strip_prefix("./") {
        stripped
    } else {
        base_path.as_ref()
    };

    if !path.starts_with(stripped) {
        warn!("file path: {:?}", path);
        return Err(InvalidPath);
    }
    Ok(path)
}
