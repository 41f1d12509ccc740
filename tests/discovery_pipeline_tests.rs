mod common;

use std::collections::HashSet;
use std::num::NonZeroUsize;

use common::{post, practitioner};
use wellness_hub::discovery::{Category, Criteria, SortKey, discover};
use wellness_hub::types::{Post, Practitioner};

fn size(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

fn ten_practitioners_three_reiki() -> Vec<Practitioner> {
    (1..=10)
        .map(|id| {
            let specialties: &[&str] = if id % 3 == 0 { &["Reiki", "Yoga"] } else { &["Yoga"] };
            practitioner(id, &format!("Practitioner {id}"), specialties)
        })
        .collect()
}

#[test]
fn category_filter_keeps_only_tagged_practitioners() {
    let items = ten_practitioners_three_reiki();
    let criteria = Criteria::new(size(10)).category(Category::parse("Reiki"));

    let page = discover(&items, &criteria);

    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total_items, 3);
    assert_eq!(page.total_pages, 1);
    assert!(page.items.iter().all(|p| p.has_specialty("Reiki")));
}

#[test]
fn category_match_ignores_casing() {
    let items = ten_practitioners_three_reiki();
    let lower = discover(&items, &Criteria::new(size(10)).category(Category::parse("reiki")));
    let upper = discover(&items, &Criteria::new(size(10)).category(Category::parse("REIKI")));
    assert_eq!(lower.total_items, 3);
    assert_eq!(lower, upper);
}

#[test]
fn all_category_disables_filter() {
    let items = ten_practitioners_three_reiki();
    assert_eq!(Category::parse(" All "), Category::All);
    assert_eq!(Category::parse(""), Category::All);
    let page = discover(&items, &Criteria::new(size(10)).category(Category::parse("all")));
    assert_eq!(page.total_items, 10);
}

#[test]
fn second_page_by_replies_holds_ranks_eleven_to_twenty() {
    // Reply counts are a permutation so the ranking is unambiguous.
    let items: Vec<Post> = (1..=25)
        .map(|id| post(id, "Geral", ((id * 7) % 25) as u32))
        .collect();
    let criteria = Criteria::new(size(10)).sort(SortKey::Popular).page(2);

    let page = discover(&items, &criteria);

    let mut ranked = items.clone();
    ranked.sort_by(|a, b| b.replies.cmp(&a.replies));
    let expected: Vec<i64> = ranked[10..20].iter().map(|p| p.id).collect();
    let got: Vec<i64> = page.items.iter().map(|p| p.id).collect();

    assert_eq!(got, expected);
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_items, 25);
}

#[test]
fn replies_alias_parses_to_popular() {
    assert_eq!("replies".parse::<SortKey>().unwrap(), SortKey::Popular);
    assert_eq!("likes".parse::<SortKey>().unwrap(), SortKey::Likes);
    assert_eq!("Top_Rated".parse::<SortKey>().unwrap(), SortKey::TopRated);
    assert!("sideways".parse::<SortKey>().is_err());
}

#[test]
fn text_query_is_case_insensitive_substring_on_name() {
    let items = vec![
        practitioner(1, "Ana Silva", &["Reiki"]),
        practitioner(2, "Juliana Barbosa", &["Yoga"]),
        practitioner(3, "Marcos Dias", &["Reiki"]),
    ];

    let page = discover(&items, &Criteria::new(size(10)).text("ana").sort(SortKey::Oldest));
    let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Ana Silva", "Juliana Barbosa"]);

    let page = discover(&items, &Criteria::new(size(10)).text("  ANA "));
    assert_eq!(page.total_items, 2);
}

#[test]
fn empty_input_yields_empty_first_page() {
    let items: Vec<Practitioner> = Vec::new();
    let criteria = Criteria::new(size(10))
        .text("anything")
        .category(Category::parse("Reiki"))
        .sort(SortKey::PriceDesc)
        .page(4);

    let page = discover(&items, &criteria);

    assert!(page.items.is_empty());
    assert_eq!(page.total_items, 0);
    assert_eq!(page.total_pages, 0);
    assert_eq!(page.page, 1);
}

#[test]
fn page_past_the_end_is_clamped_to_last() {
    let items: Vec<Post> = (1..=12).map(|id| post(id, "Geral", 0)).collect();
    let page = discover(&items, &Criteria::new(size(5)).page(99));
    assert_eq!(page.page, 3);
    assert_eq!(page.items.len(), 2);
}

#[test]
fn zero_page_size_is_rejected() {
    assert!(Criteria::with_page_size(0).is_err());
    assert_eq!(Criteria::with_page_size(3).unwrap().page_size.get(), 3);
}

#[test]
fn pipeline_is_idempotent() {
    let items = ten_practitioners_three_reiki();
    let criteria = Criteria::new(size(4)).text("practitioner").sort(SortKey::Recent).page(2);
    assert_eq!(discover(&items, &criteria), discover(&items, &criteria));
}

#[test]
fn result_never_exceeds_input() {
    let items: Vec<Post> = (1..=30)
        .map(|id| post(id, if id % 2 == 0 { "Dúvidas" } else { "Geral" }, 0))
        .collect();
    for category in ["", "Geral", "Dúvidas", "Nada"] {
        for query in ["", "1", "post", "zzz"] {
            let criteria = Criteria::new(size(50))
                .category(Category::parse(category))
                .text(query);
            let page = discover(&items, &criteria);
            assert!(page.total_items <= items.len());
            assert!(page.items.len() <= page.total_items);
        }
    }
}

#[test]
fn search_returns_exactly_the_matching_items() {
    let items: Vec<Post> = (1..=30).map(|id| post(id, "Geral", 0)).collect();
    let criteria = Criteria::new(size(100)).text("number 1");
    let page = discover(&items, &criteria);

    let expected: HashSet<i64> = items
        .iter()
        .filter(|p| p.content.to_lowercase().contains("number 1"))
        .map(|p| p.id)
        .collect();
    let got: HashSet<i64> = page.items.iter().map(|p| p.id).collect();
    assert_eq!(got, expected);
    assert_eq!(got.len(), 11);
}

#[test]
fn equal_sort_keys_keep_input_order() {
    // Input order deliberately differs from id order.
    let ids = [7, 3, 9, 1, 5, 2, 8];
    let items: Vec<Post> = ids
        .iter()
        .map(|&id| post(id, "Geral", if id % 2 == 0 { 4 } else { 2 }))
        .collect();

    let page = discover(&items, &Criteria::new(size(10)).sort(SortKey::Popular));
    let got: Vec<i64> = page.items.iter().map(|p| p.id).collect();

    assert_eq!(got, vec![2, 8, 7, 3, 9, 1, 5]);
}

#[test]
fn concatenated_pages_reproduce_filtered_set() {
    let items: Vec<Post> = (1..=23)
        .map(|id| post(id, if id % 4 == 0 { "Outro" } else { "Geral" }, (id % 5) as u32))
        .collect();
    let base = Criteria::new(size(4))
        .category(Category::parse("geral"))
        .sort(SortKey::Popular);

    let first = discover(&items, &base);
    let mut seen: Vec<i64> = Vec::new();
    for n in 1..=first.total_pages {
        seen.extend(discover(&items, &base.clone().page(n)).items.iter().map(|p| p.id));
    }

    let unique: HashSet<i64> = seen.iter().copied().collect();
    assert_eq!(seen.len(), first.total_items);
    assert_eq!(unique.len(), seen.len());

    let everything = Criteria::new(size(100))
        .category(Category::parse("geral"))
        .sort(SortKey::Popular);
    let whole = discover(&items, &everything);
    let whole_ids: Vec<i64> = whole.items.iter().map(|p| p.id).collect();
    assert_eq!(seen, whole_ids);
}

#[test]
fn records_missing_sort_key_go_last() {
    let mut cheap = practitioner(1, "Cheap", &[]);
    cheap.price = Some(80.0);
    let unpriced = practitioner(2, "Unpriced", &[]);
    let mut pricey = practitioner(3, "Pricey", &[]);
    pricey.price = Some(250.0);
    let items = vec![unpriced, pricey, cheap];

    let asc = discover(&items, &Criteria::new(size(10)).sort(SortKey::PriceAsc));
    let desc = discover(&items, &Criteria::new(size(10)).sort(SortKey::PriceDesc));

    let ids = |page: &wellness_hub::discovery::Page<Practitioner>| -> Vec<i64> {
        page.items.iter().map(|p| p.id).collect()
    };
    assert_eq!(ids(&asc), vec![1, 3, 2]);
    assert_eq!(ids(&desc), vec![3, 1, 2]);
}

#[test]
fn location_filter_matches_substring() {
    let mut rio = practitioner(1, "Ana", &[]);
    rio.location = Some("Rio de Janeiro".to_string());
    let sp = practitioner(2, "Bia", &[]);
    let mut remote = practitioner(3, "Caio", &[]);
    remote.location = None;

    let page = discover(&[rio, sp, remote], &Criteria::new(size(10)).location("rio"));
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Ana");
}

#[test]
fn recent_sort_puts_newest_first() {
    let items: Vec<Post> = (1..=5).map(|id| post(id, "Geral", 0)).collect();
    let page = discover(&items, &Criteria::new(size(10)));
    let got: Vec<i64> = page.items.iter().map(|p| p.id).collect();
    assert_eq!(got, vec![5, 4, 3, 2, 1]);
}

#[test]
fn likes_sort_uses_like_counter_not_replies() {
    let mut chatty = post(1, "Geral", 5);
    chatty.likes = 0;
    let mut loved = post(2, "Geral", 0);
    loved.likes = 100;
    let items = vec![chatty, loved];

    let by_likes = discover(&items, &Criteria::new(size(10)).sort("likes".parse().unwrap()));
    let by_replies = discover(&items, &Criteria::new(size(10)).sort("replies".parse().unwrap()));

    let ids = |page: &wellness_hub::discovery::Page<Post>| -> Vec<i64> {
        page.items.iter().map(|p| p.id).collect()
    };
    assert_eq!(ids(&by_likes), vec![2, 1]);
    assert_eq!(ids(&by_replies), vec![1, 2]);
}

#[test]
fn accented_names_match_across_casing() {
    let items = vec![
        practitioner(1, "Ana", &["Terapia Floral"]),
        practitioner(2, "Bia", &["Ênfase Corporal"]),
        practitioner(3, "Caio", &["Água Viva"]),
    ];
    assert!(items[2].has_specialty("ÁGUA VIVA"));
    assert!(items[1].has_specialty("ênfase corporal"));

    let page = discover(&items, &Criteria::new(size(10)).category(Category::parse("água viva")));
    let got: Vec<i64> = page.items.iter().map(|p| p.id).collect();
    assert_eq!(got, vec![3]);

    let posts = vec![post(1, "Dúvidas", 0), post(2, "Geral", 0)];
    let page = discover(&posts, &Criteria::new(size(10)).category(Category::parse("DÚVIDAS")));
    assert_eq!(page.total_items, 1);
    assert_eq!(page.items[0].id, 1);
}
