use clap::Parser;

use crate::http::{Destination, Method};

#[derive(Parser)]
pub struct FetchCommand {
    /// Absolute URL, or a path relative to the origin
    #[clap()]
    pub url: String,
    /// HTTP method. Only GET requests are intercepted
    #[clap(long, short = 'X', default_value = "GET")]
    pub method: Method,
    /// Resource type the page declared for the request: empty, document,
    /// image, font, script or style
    #[clap(long, short, default_value = "empty")]
    pub destination: Destination,
    /// Request header as `Name: value`. Can be repeated
    #[clap(long = "header", short = 'H', value_name = "HEADER")]
    pub headers: Vec<String>,
    /// Request body sent with POST, PUT and PATCH
    #[clap(long)]
    pub data: Option<String>,
    /// Write the response body to a file instead of stdout
    #[clap(long, short)]
    pub output: Option<String>,
}

pub struct FetchOptions {
    pub url: String,
    pub method: Method,
    pub destination: Destination,
    pub headers: Vec<String>,
    pub data: Option<String>,
    pub output: Option<String>,
}

impl From<FetchCommand> for FetchOptions {
    fn from(options: FetchCommand) -> Self {
        FetchOptions {
            url: options.url,
            method: options.method,
            destination: options.destination,
            headers: options.headers,
            data: options.data,
            output: options.output,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Parser)]
    struct Wrapper {
        #[clap(flatten)]
        fetch: FetchCommand,
    }

    #[test]
    fn test_fetch_defaults_to_plain_get() {
        let args = Wrapper::parse_from(["fetch", "/index.html"]);
        let options: FetchOptions = args.fetch.into();
        assert_eq!("/index.html", options.url);
        assert_eq!(Method::GET, options.method);
        assert_eq!(Destination::Empty, options.destination);
        assert!(options.output.is_none());
        assert!(options.headers.is_empty());
    }

    #[test]
    fn test_fetch_image_post_options() {
        let args = Wrapper::parse_from([
            "fetch",
            "/optimized/image2.webp",
            "-d",
            "image",
            "-X",
            "post",
            "--data",
            "name=Sandra",
            "-H",
            "Content-Type: application/x-www-form-urlencoded",
        ]);
        let options: FetchOptions = args.fetch.into();
        assert_eq!(Method::POST, options.method);
        assert_eq!(
            vec!["Content-Type: application/x-www-form-urlencoded"],
            options.headers
        );
        assert_eq!(Destination::Image, options.destination);
        assert_eq!(Some("name=Sandra".to_string()), options.data);
    }

    #[test]
    fn test_fetch_rejects_unknown_method_and_destination() {
        assert!(Wrapper::try_parse_from(["fetch", "/", "-X", "TRACE"]).is_err());
        assert!(Wrapper::try_parse_from(["fetch", "/", "-d", "video"]).is_err());
    }
}
