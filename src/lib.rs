use std::path::PathBuf;

use request::Request;
use response_writer::ResponseWriter;
use router::Router;
use server::{HttpMethod, Server};
use status::Status;

mod file_server;
mod headers;
mod middleware;
mod multi_map;
mod request;
mod response_writer;
mod router;
mod server;
mod status;
mod stream_reader;
#[cfg(test)]
mod test_utils;

fn home(w: &mut ResponseWriter, r: &mut Request) {
    // The root action owns everything no deeper route claimed; anything
    // left unmatched under it is unknown.
    if !r.get_path_info().is_empty() {
        w.set_status(Status::NotFound);
        return;
    }
    w.set_status(Status::OK);
}

fn echo(w: &mut ResponseWriter, r: &mut Request) {
    let Some(msg) = r.get_param("msg") else {
        w.set_status(Status::BadRequest);
        return;
    };
    w.set_status(Status::OK);
    w.set_body_str(msg);
}

fn user_agent(w: &mut ResponseWriter, r: &mut Request) {
    match r.get_headers().get_user_agent() {
        Ok(Some(ua)) => {
            w.set_status(Status::OK);
            w.set_body_str(ua);
        }
        _ => w.set_status(Status::BadRequest),
    }
}

pub fn run(addr: &str, directory: Option<PathBuf>) {
    let file_retriever = directory
        .as_ref()
        .map(|dir| file_server::new_file_retriever(dir));
    let file_writer = directory
        .as_ref()
        .map(|dir| file_server::new_file_writer(dir));

    let mut router = Router::new();
    router.add_route(HttpMethod::Get, "/", &home);
    router.add_route(HttpMethod::Get, "/echo/:msg", &echo);
    router.add_route(HttpMethod::Get, "/user-agent", &user_agent);
    if let Some(file_retriever) = &file_retriever {
        router.add_route(HttpMethod::Get, "/files", file_retriever);
    }
    if let Some(file_writer) = &file_writer {
        router.add_route(HttpMethod::Post, "/files", file_writer);
    }

    Server::new(addr).run(middleware::gzip::new(router));
}
