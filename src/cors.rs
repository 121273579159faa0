use rocket::{
    fairing::{Fairing, Info, Kind},
    http::{Header, Status},
    request::Request,
    response::Response,
};


/// Allows cross-origin calls from any origin, credentials included.
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        // "*" is not honored together with credentials, so echo the caller.
        let origin = req.headers().get_one("Origin").unwrap_or("*").to_owned();

        res.set_header(Header::new("Access-Control-Allow-Origin", origin));
        res.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
        res.set_header(Header::new("Access-Control-Allow-Methods",
            "GET, POST, PUT, PATCH, DELETE, OPTIONS"));
        res.set_header(Header::new("Access-Control-Allow-Headers",
            req.headers().get_one("Access-Control-Request-Headers").unwrap_or("*").to_owned()));
        res.set_header(Header::new("Vary", "Origin"));
    }
}


#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::NoContent
}
