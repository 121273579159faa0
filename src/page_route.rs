use rocket::{
    State,
    response::content::RawHtml,
    tokio::fs,
};
use log::warn;

use crate::config::ServerConfig;


const MAP_PAGE: &'static str = "mapa.html";

const INDEX_PAGE: &'static str = r#"<html>
    <head><title>Reportes GPS API</title></head>
    <body>
        <h1>API de Reportes GPS</h1>
        <p>Reportes con coordenadas GPS y fotos.</p>
        <ul>
            <li><a href="/mapa">Ver mapa de reportes</a></li>
            <li><a href="/reportes/">Ver reportes (JSON)</a></li>
            <li><a href="/stats">Estadisticas (JSON)</a></li>
        </ul>
    </body>
</html>"#;


#[get("/")]
pub fn index() -> RawHtml<&'static str> {
    RawHtml(INDEX_PAGE)
}

#[get("/mapa")]
pub async fn map_page(config: &State<ServerConfig>) -> RawHtml<String> {
    let path = config.static_dir.join(MAP_PAGE);

    match fs::read_to_string(&path).await {
        Ok(page) => RawHtml(page),
        Err(err) => {
            warn!("Can't read {}: {}", path.display(), err);
            RawHtml(format!("<h1>Error: {} not found</h1>", MAP_PAGE))
        },
    }
}
