//! Клиентская библиотека входа через социальную сеть (Graph API).
//!
//! Основной сценарий описывает [`LoginFlow`]:
//! - инициализация SDK через [`AuthProvider`];
//! - вход с запросом разрешений (ожидание решения пользователя);
//! - параллельная загрузка профиля и постов с локального `/posts`;
//! - все сообщения уходят в один [`NotificationSink`].
//!
//! Дополнительно библиотека даёт HTTP-клиент Graph API ([`GraphApi`]):
//! токен приложения, обмен кода на токен, профиль и отметку «Hello World».
#![warn(missing_docs)]

mod config;
mod error;
mod flow;
mod http_client;
mod models;
mod provider;
mod sink;
mod summary;

pub use config::{
    DEFAULT_API_VERSION, DEFAULT_DIALOG_URL, DEFAULT_GRAPH_URL, FlowConfig, Scope, SdkOptions,
};
pub use error::{SocialClientError, SocialClientResult};
pub use flow::{
    AuthorizedOutcome, CANCELLED_MESSAGE, FlowOutcome, FlowState, LoginFlow, PostsSource,
    WELCOME_MESSAGE, greeting,
};
pub use http_client::{GraphApi, PostsApi};
pub use models::{
    AuthResponse, CheckIn, Coordinates, FeedPost, Place, PlaceLocation, PostsList, PostsSummary,
    Profile,
};
pub use provider::{
    AuthProvider, ConsentPrompt, GraphAuthProvider, authorization_code_from_redirect,
    authorize_url,
};
pub use sink::{ConsoleSink, HtmlSink, NotificationSink, RecordingSink, StdoutSink};
pub use summary::{PostsReport, PostsVariant, summarize_counts, summarize_list};
