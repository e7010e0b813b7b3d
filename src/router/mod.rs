pub use dispatch::{Dispatcher, Outcome};

use crate::{
    request::Request,
    response_writer::ResponseWriter,
    server::{Handler, HttpMethod},
    status::Status,
};

mod build;
mod dispatch;
mod route;
mod segment;

pub struct Router<'a> {
    tables: [Dispatcher<'a>; 4],
}

impl<'a> Router<'a> {
    pub fn new() -> Self {
        Self {
            tables: [
                Dispatcher::new_empty(),
                Dispatcher::new_empty(),
                Dispatcher::new_empty(),
                Dispatcher::new_empty(),
            ],
        }
    }

    pub fn add_route(
        &mut self,
        http_method: HttpMethod,
        pattern: &str,
        handler: &'a (impl Handler + Sync),
    ) {
        self.tables[http_method as usize].add_route(pattern, handler);
    }

    fn find_allowed_methods(&self, path: &str) -> Vec<HttpMethod> {
        self.tables
            .iter()
            .enumerate()
            .filter_map(|(idx, table)| {
                if table.matches(path) {
                    Some(HttpMethod::try_from(idx).unwrap())
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn handle(&self, w: &mut ResponseWriter, r: &mut Request) {
        let Ok(http_method) = HttpMethod::try_from(r.get_http_method()) else {
            w.set_status(Status::BadRequest);
            return;
        };

        if let Outcome::Matched = self.tables[http_method as usize].dispatch(w, r) {
            return;
        }

        let allowed_methods = self.find_allowed_methods(r.get_path_info());
        if !allowed_methods.is_empty() {
            w.add_allow_header(allowed_methods);
            w.set_status(Status::MethodNotAllowed);
            return;
        }

        w.set_status(Status::NotFound);
    }
}

impl Handler for Router<'_> {
    fn handle(&self, w: &mut ResponseWriter, r: &mut Request) {
        self.handle(w, r);
    }
}
