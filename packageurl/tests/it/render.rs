use packageurl::{PackageUrl, Qualifiers};
use simple_test_case::test_case;

#[test]
fn full_record() {
    let purl = PackageUrl::builder()
        .package_type("maven")
        .namespace("org.apache.commons")
        .name("io")
        .version("1.3.4")
        .qualifiers(Qualifiers::from_pairs([("type", "jar")]).expect("valid qualifiers"))
        .subpath("com/example/Util.class")
        .build();
    pretty_assertions::assert_eq!(
        purl.to_string(),
        "pkg:maven/org.apache.commons/io@1.3.4?type=jar#com/example/Util.class"
    );
}

#[test]
fn slash_in_name_is_escaped() {
    let purl = PackageUrl::builder().package_type("deb").name("ab/c").build();
    pretty_assertions::assert_eq!(purl.to_string(), "pkg:deb/ab%2Fc");
}

#[test_case("@angular", "pkg:generic/%40angular/core"; "at")]
#[test_case("a b/c", "pkg:generic/a%20b/c/core"; "space_in_segment")]
#[test_case("x/y/z", "pkg:generic/x/y/z/core"; "segments")]
#[test]
fn namespace_segments(namespace: &str, expected: &str) {
    let purl = PackageUrl::builder()
        .package_type("generic")
        .namespace(namespace)
        .name("core")
        .build();
    pretty_assertions::assert_eq!(purl.to_string(), expected);
}

#[test]
fn version_is_escaped() {
    let purl = PackageUrl::builder()
        .package_type("docker")
        .name("dockerimage")
        .version("sha256:244fd47e07d10")
        .build();
    pretty_assertions::assert_eq!(purl.to_string(), "pkg:docker/dockerimage@sha256%3A244fd47e07d10");
}

#[test]
fn qualifiers_render_sorted_without_empty_values() {
    let qualifiers = Qualifiers::from_pairs([
        ("os", "linux"),
        ("empty", ""),
        ("arch", "amd64"),
        ("repository_url", "repo.spring.io/release"),
    ])
    .expect("valid qualifiers");
    let purl = PackageUrl::builder()
        .package_type("generic")
        .name("openssl")
        .qualifiers(qualifiers)
        .build();
    pretty_assertions::assert_eq!(
        purl.to_string(),
        "pkg:generic/openssl?arch=amd64&os=linux&repository_url=repo.spring.io%2Frelease"
    );
}

#[test]
fn subpath_segments_are_escaped() {
    let purl = PackageUrl::builder()
        .package_type("generic")
        .name("openssl")
        .subpath("docs/read me.txt")
        .build();
    pretty_assertions::assert_eq!(purl.to_string(), "pkg:generic/openssl#docs/read%20me.txt");
}

#[test]
fn only_empty_qualifiers() {
    let purl = PackageUrl::builder()
        .package_type("generic")
        .name("openssl")
        .qualifiers(Qualifiers::from_pairs([("arch", "")]).expect("valid qualifiers"))
        .build();
    pretty_assertions::assert_eq!(purl.to_string(), "pkg:generic/openssl");
}

#[test]
fn reencoding_is_idempotent() {
    let inputs = [
        "pkg:npm/%40angular/animation@12.3.1",
        "pkg:deb/debian/curl@7.50.3-1?arch=i386&distro=jessie",
        "pkg:docker/customer/dockerimage@sha256%3A244fd47e07d10?repository_url=gcr.io",
        "pkg:generic/bitwarderl?vcs_url=git%2Bhttps%3A%2F%2Fgit.fsfe.org%2Fdxtr%2Fbitwarderl%40cc55108da32",
        "pkg:golang/google.golang.org/genproto#googleapis/api/annotations",
    ];
    for input in inputs {
        let once = PackageUrl::parse(input).expect("must parse").to_string();
        let twice = PackageUrl::parse(&once).expect("must parse").to_string();
        pretty_assertions::assert_eq!(once, input);
        pretty_assertions::assert_eq!(twice, once);
    }
}
