use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use blogpost_client::{
    BlogClient, BlogClientError, Comment, Draft, ListDraftsResponse, ListPostsResponse, Post,
    PostDetail, Tokens, User,
};
use clap::{Parser, Subcommand};
use serde::Serialize;

const TOKEN_FILE: &str = ".blogpost_token";
const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "blogpost-cli", version, about = "CLI клиент для blogpost-server")]
struct Cli {
    /// Адрес сервера. По умолчанию берётся из BLOGPOST_SERVER.
    #[arg(long, global = true, env = "BLOGPOST_SERVER")]
    server: Option<String>,

    /// Печатать ответы сервера как JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Подтверждение email по токену из письма.
    Confirm {
        #[arg(long)]
        token: String,
    },
    /// Вход пользователя.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Обновление access token по сохранённому refresh token.
    Refresh,
    /// Выход: удаляет сохранённые токены.
    Logout,
    /// Запрос письма для сброса пароля.
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Установка нового пароля по токену сброса.
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long)]
        password: String,
    },
    /// Список постов.
    List {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Получение поста по id или slug.
    Get {
        #[arg(long)]
        id: String,
    },
    /// Создание поста (требует токен).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
    },
    /// Замена текста поста (требует токен).
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        body: String,
    },
    /// Удаление поста (требует токен).
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Посты текущего пользователя (требует токен).
    MyPosts {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Комментарии к посту.
    Comments {
        #[arg(long)]
        post_id: i64,
    },
    /// Новый комментарий (требует токен).
    Comment {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        message: String,
    },
    /// Операции с черновиками (требуют токен).
    #[command(subcommand)]
    Draft(DraftCommand),
}

#[derive(Debug, Subcommand)]
enum DraftCommand {
    /// Список черновиков.
    List {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Получение черновика.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Создание черновика.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
    },
    /// Частичное обновление черновика.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    /// Удаление черновика.
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredTokens {
    access_token: String,
    refresh_token: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let json = cli.json;

    let server = normalize_server(cli.server.unwrap_or_else(|| DEFAULT_SERVER.to_string()));
    let mut client = BlogClient::new(server).map_err(map_client_error)?;

    if let Some(stored) = load_tokens().context("не удалось прочитать .blogpost_token")? {
        client.set_tokens(stored.access_token, stored.refresh_token);
    }

    match cli.command {
        Command::Register {
            full_name,
            username,
            email,
            password,
        } => {
            let user = client
                .register(&full_name, &username, &email, &password)
                .await
                .map_err(map_client_error)?;
            output(json, &user, || {
                print_user("Регистрация успешна, подтвердите email по ссылке из письма", &user)
            })?;
        }
        Command::Confirm { token } => {
            let message = client.confirm_email(&token).await.map_err(map_client_error)?;
            println!("{message}");
        }
        Command::Login { username, password } => {
            let tokens = client
                .login(&username, &password)
                .await
                .map_err(map_client_error)?;
            persist_tokens(&client).context("не удалось сохранить токены")?;
            output(json, &tokens, || print_tokens("Вход выполнен", &tokens))?;
        }
        Command::Refresh => {
            let access_token = client.refresh().await.map_err(map_client_error)?;
            persist_tokens(&client).context("не удалось сохранить токены")?;
            println!("Токен обновлён");
            println!("access_token: {access_token}");
        }
        Command::Logout => {
            client.clear_tokens();
            remove_tokens().context("не удалось удалить .blogpost_token")?;
            println!("Токены удалены");
        }
        Command::ForgotPassword { email } => {
            let message = client
                .forgot_password(&email)
                .await
                .map_err(map_client_error)?;
            println!("{message}");
        }
        Command::ResetPassword { token, password } => {
            let reset = client
                .reset_password(&token, &password)
                .await
                .map_err(map_client_error)?;
            output(json, &reset, || print_user(&reset.message, &reset.user))?;
        }
        Command::List { skip, limit } => {
            let list = client
                .list_posts(skip, limit)
                .await
                .map_err(map_client_error)?;
            output(json, &list, || print_list(&list))?;
        }
        Command::Get { id } => {
            let post = client.get_post(&id).await.map_err(map_client_error)?;
            output(json, &post, || print_post_detail(&post))?;
        }
        Command::Create { title, body } => {
            let post = client
                .create_post(&title, &body)
                .await
                .map_err(map_client_error)?;
            output(json, &post, || print_post("Пост создан", &post))?;
        }
        Command::Update { id, body } => {
            let post = client
                .update_post(id, &body)
                .await
                .map_err(map_client_error)?;
            output(json, &post, || print_post("Пост обновлён", &post))?;
        }
        Command::Delete { id } => {
            client.delete_post(id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
        Command::MyPosts { skip, limit } => {
            let list = client
                .my_posts(skip, limit)
                .await
                .map_err(map_client_error)?;
            output(json, &list, || print_list(&list))?;
        }
        Command::Comments { post_id } => {
            let comments = client
                .list_comments(post_id)
                .await
                .map_err(map_client_error)?;
            output(json, &comments, || {
                println!("Комментариев: {}", comments.len());
                comments.iter().for_each(print_comment);
            })?;
        }
        Command::Comment { post_id, message } => {
            let comment = client
                .add_comment(post_id, &message)
                .await
                .map_err(map_client_error)?;
            output(json, &comment, || print_comment(&comment))?;
        }
        Command::Draft(command) => run_draft(&client, json, command).await?,
    }

    Ok(())
}

async fn run_draft(client: &BlogClient, json: bool, command: DraftCommand) -> Result<()> {
    match command {
        DraftCommand::List { skip, limit } => {
            let list = client
                .list_drafts(skip, limit)
                .await
                .map_err(map_client_error)?;
            output(json, &list, || print_draft_list(&list))?;
        }
        DraftCommand::Get { id } => {
            let draft = client.get_draft(id).await.map_err(map_client_error)?;
            output(json, &draft, || print_draft("Черновик", &draft))?;
        }
        DraftCommand::Create { title, body } => {
            let draft = client
                .create_draft(&title, &body)
                .await
                .map_err(map_client_error)?;
            output(json, &draft, || print_draft("Черновик создан", &draft))?;
        }
        DraftCommand::Update { id, title, body } => {
            let draft = client
                .update_draft(id, title.as_deref(), body.as_deref())
                .await
                .map_err(map_client_error)?;
            output(json, &draft, || print_draft("Черновик обновлён", &draft))?;
        }
        DraftCommand::Delete { id } => {
            client.delete_draft(id).await.map_err(map_client_error)?;
            println!("Черновик удалён: id={id}");
        }
    }
    Ok(())
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

/// Первая строка файла: access token, вторая (необязательная): refresh token.
fn parse_token_content(raw: &str) -> Option<StoredTokens> {
    let mut lines = raw.lines().map(str::trim).filter(|line| !line.is_empty());
    let access_token = lines.next()?.to_string();
    let refresh_token = lines.next().map(str::to_string);
    Some(StoredTokens {
        access_token,
        refresh_token,
    })
}

fn format_token_content(access_token: &str, refresh_token: Option<&str>) -> String {
    match refresh_token {
        Some(refresh_token) => format!("{access_token}\n{refresh_token}\n"),
        None => format!("{access_token}\n"),
    }
}

fn load_tokens() -> io::Result<Option<StoredTokens>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn persist_tokens(client: &BlogClient) -> io::Result<()> {
    if let Some(access_token) = client.access_token() {
        fs::write(
            TOKEN_FILE,
            format_token_content(access_token, client.refresh_token()),
        )?;
    }
    Ok(())
}

fn remove_tokens() -> io::Result<()> {
    match fs::remove_file(TOKEN_FILE) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn map_client_error(err: BlogClientError) -> anyhow::Error {
    let message = match err {
        BlogClientError::Unauthorized(message) => format!(
            "требуется авторизация ({message}): выполните `blogpost-cli login ...` или `blogpost-cli refresh`"
        ),
        BlogClientError::Forbidden(message) => format!("доступ запрещён: {message}"),
        BlogClientError::NotFound(message) => format!("ресурс не найден: {message}"),
        BlogClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        BlogClientError::Server(message) => format!("ошибка сервера: {message}"),
        BlogClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

fn output<T: Serialize>(json: bool, value: &T, human: impl FnOnce()) -> Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(value).context("не удалось сериализовать ответ")?;
        println!("{rendered}");
    } else {
        human();
    }
    Ok(())
}

fn print_user(title: &str, user: &User) {
    println!("{title}");
    println!("user:");
    println!("  id: {}", user.id);
    println!("  full_name: {}", user.full_name);
    println!("  username: {}", user.username);
    println!("  email: {}", user.email);
    println!("  created_at: {}", user.created_at);
}

fn print_tokens(title: &str, tokens: &Tokens) {
    println!("{title}");
    println!("token_type: {}", tokens.token_type);
    println!("access_token: {}", tokens.access_token);
    println!("refresh_token: {}", tokens.refresh_token);
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("slug: {}", post.slug);
    println!("title: {}", post.title);
    println!("body: {}", post.body);
    println!("user_id: {}", post.user_id);
    println!("created_at: {}", post.created_at);
    println!("updated_at: {}", post.updated_at);
}

fn print_post_detail(post: &PostDetail) {
    println!("Пост");
    println!("id: {}", post.id);
    println!("slug: {}", post.slug);
    println!("title: {}", post.title);
    println!("author: {} (@{})", post.author.full_name, post.author.username);
    println!("created_at: {}", post.created_at);
    println!("updated_at: {}", post.updated_at);
    println!();
    println!("{}", post.body);
    println!();
    println!("Комментариев: {}", post.comments.len());
    post.comments.iter().for_each(print_comment);
}

fn print_comment(comment: &Comment) {
    println!(
        "- [{}] @{}: {} ({})",
        comment.id, comment.author.username, comment.message, comment.created_at
    );
}

fn print_list(list: &ListPostsResponse) {
    println!(
        "Постов: {} (skip={}, limit={}, total={})",
        list.posts.len(),
        list.skip,
        list.limit,
        list.total
    );

    for post in &list.posts {
        println!("- [{}] {} ({})", post.id, post.title, post.slug);
    }
}

fn print_draft(title: &str, draft: &Draft) {
    println!("{title}");
    println!("id: {}", draft.id);
    println!("title: {}", draft.title);
    println!("body: {}", draft.body);
    println!("updated_at: {}", draft.updated_at);
}

fn print_draft_list(list: &ListDraftsResponse) {
    println!(
        "Черновиков: {} (skip={}, limit={}, total={})",
        list.drafts.len(),
        list.skip,
        list.limit,
        list.total
    );

    for draft in &list.drafts {
        println!("- [{}] {}", draft.id, draft.title);
    }
}
