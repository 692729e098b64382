use anyhow::{Context, Result};
use pradera_domain::Flow;
use pradera_service::{FlowCriteria, Repositories, ServiceConfig, Services};
use pradera_store::{InMemoryBlockSearch, Pageable, UserDirectory};
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pequeño menú interactivo para administrar flows y sus documentos usando
/// el store de `pradera-persistence`.
///
/// Opciones soportadas:
/// 1) Ver flows
/// 2) Crear flow
/// 3) Ver documento de un flow
/// 4) Enviar documento del editor (JSON)
/// 5) Buscar bloques
/// 6) Historial de un bloque
/// 7) Eliminar flow
/// 8) Salir
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(io::stderr)).init();

    let config = ServiceConfig::from_env().context("configuración inválida")?;
    // Inicializar store (aplica migraciones embebidas si procede)
    let store = pradera_persistence::new_from_env().context("no se pudo abrir la base de datos")?;
    let repos = Repositories::from_store(Arc::new(store), Arc::new(InMemoryBlockSearch::new()));
    let services = Services::new(&repos, &config);
    let indexed = services.blocks.rebuild_index()?;
    log::info!("índice de búsqueda listo ({} bloques); usuario '{}'", indexed, config.acting_login);

    loop {
        println!("\n== Pradera CLI menu ==");
        println!("1) Ver flows");
        println!("2) Crear flow");
        println!("3) Ver documento de un flow");
        println!("4) Enviar documento del editor (JSON)");
        println!("5) Buscar bloques");
        println!("6) Historial de un bloque");
        println!("7) Eliminar flow");
        println!("8) Salir");
        print!("Elige una opción: ");
        io::stdout().flush().ok();

        let mut choice = String::new();
        if io::stdin().read_line(&mut choice)? == 0 {
            break;
        }
        match choice.trim() {
            "1" => match services.flows.find_by_criteria(&FlowCriteria::default(), &Pageable::unpaged()) {
                Ok(page) => {
                    println!("\nID     | VERSION | USER   | BOOK   | NAME");
                    println!("-------------------------------------------------------");
                    for f in page.content {
                        println!("{:<6} | {:<7} | {:<6} | {:<6} | {}",
                                 f.id.unwrap_or_default(),
                                 f.version,
                                 opt(f.user_id),
                                 opt(f.book_id),
                                 f.name);
                    }
                    println!("({} de {})", page.size.min(page.total_elements as u32), page.total_elements);
                }
                Err(e) => eprintln!("Error listando flows: {}", e),
            },
            "2" => {
                let name = prompt("Nombre: ")?;
                let book = prompt("Libro (id, enter para ninguno): ")?;
                let Some(owner) = owner_id(&repos, &config.acting_login) else {
                    eprintln!("Usuario desconocido: {}", config.acting_login);
                    continue;
                };
                let mut flow = Flow::new(name.trim()).owned_by(owner);
                if !book.trim().is_empty() {
                    match book.trim().parse() {
                        Ok(id) => flow = flow.in_book(id),
                        Err(_) => {
                            eprintln!("Id de libro inválido");
                            continue;
                        }
                    }
                }
                match services.flows.create(flow) {
                    Ok(f) => println!("Flow creado: {}", f.id.unwrap_or_default()),
                    Err(e) => eprintln!("Error creando flow: {}", e),
                }
            }
            "3" => {
                let Some(id) = prompt_id("Flow id: ")? else { continue };
                match services.flows.document(id) {
                    Ok(doc) => {
                        println!("\n{} (v{})\n", doc.flow.name, doc.flow.version);
                        print!("{}", doc);
                        match services.flows.doc_state(id) {
                            Ok(json) => println!("\n{}", serde_json::to_string_pretty(&json)?),
                            Err(e) => eprintln!("Error exportando documento: {}", e),
                        }
                    }
                    Err(e) => eprintln!("Error leyendo documento: {}", e),
                }
            }
            "4" => {
                let Some(id) = prompt_id("Flow id: ")? else { continue };
                println!("Pega el documento JSON y termina con una línea que solo contenga '.':");
                let raw = read_until_dot()?;
                let doc: serde_json::Value = match serde_json::from_str(&raw) {
                    Ok(v) => v,
                    Err(e) => {
                        eprintln!("JSON inválido: {}", e);
                        continue;
                    }
                };
                match services.flows.update_doc_state(&config.acting_login, id, &doc) {
                    Ok(doc) => {
                        println!("Documento guardado (v{}):", doc.flow.version);
                        print!("{}", doc);
                    }
                    Err(e) => eprintln!("Error guardando documento: {}", e),
                }
            }
            "5" => {
                let query = prompt("Consulta (palabras, 'type:TITLE' opcional): ")?;
                match services.blocks.search(query.trim(), &config.first_page()) {
                    Ok(page) => {
                        println!("{} resultado(s)", page.total_elements);
                        for b in page.content {
                            println!("  {}", b);
                        }
                    }
                    Err(e) => eprintln!("Error buscando: {}", e),
                }
            }
            "6" => {
                let Some(id) = prompt_id("Block id: ")? else { continue };
                match services.blocks.history(id) {
                    Ok(chain) => {
                        for b in chain {
                            println!("  {} {}", b.created_date.format("%Y-%m-%d %H:%M:%S"), b);
                        }
                    }
                    Err(e) => eprintln!("Error leyendo historial: {}", e),
                }
            }
            "7" => {
                let Some(id) = prompt_id("Flow id a eliminar: ")? else { continue };
                let confirm = prompt(&format!("Confirma borrado de {}? escribir 'yes' para confirmar: ", id))?;
                if confirm.trim().to_lowercase() == "yes" {
                    match services.flows.delete(id) {
                        Ok(()) => println!("Flow eliminado: {}", id),
                        Err(e) => eprintln!("Error eliminando flow: {}", e),
                    }
                } else {
                    println!("Borrado cancelado");
                }
            }
            "8" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

fn owner_id(repos: &Repositories, login: &str) -> Option<i64> {
    repos.users.find_by_login(login).ok().flatten().map(|u| u.id)
}

fn opt(v: Option<i64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| "-".into())
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}

fn read_until_dot() -> io::Result<String> {
    let mut raw = String::new();
    loop {
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 || line.trim() == "." {
            return Ok(raw);
        }
        raw.push_str(&line);
    }
}

fn prompt_id(msg: &str) -> io::Result<Option<i64>> {
    let s = prompt(msg)?;
    match s.trim().parse() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            eprintln!("Id inválido");
            Ok(None)
        }
    }
}
